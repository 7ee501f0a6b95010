//! Prewarm command: downloads every tile covering a view.

use std::time::Instant;

use clap::Args;
use tokio_util::sync::CancellationToken;

use gpxhost::coord::Bounds;
use gpxhost::prewarm::{PrewarmOrchestrator, PrewarmRequest, DEFAULT_PREWARM_CONCURRENCY};

use super::common::cancel_on_ctrlc;
use crate::error::CliError;
use crate::runner::{CliRunner, ConfigOverrides};

/// Arguments for the prewarm command.
#[derive(Debug, Args)]
pub struct PrewarmArgs {
    /// Provider id, as listed by `providers`
    pub provider: String,

    /// Northern edge latitude
    #[arg(long, allow_negative_numbers = true)]
    pub north: f64,

    /// Southern edge latitude
    #[arg(long, allow_negative_numbers = true)]
    pub south: f64,

    /// Eastern edge longitude
    #[arg(long, allow_negative_numbers = true)]
    pub east: f64,

    /// Western edge longitude
    #[arg(long, allow_negative_numbers = true)]
    pub west: f64,

    /// Center zoom level
    #[arg(long, allow_negative_numbers = true)]
    pub zoom: i64,

    /// Zoom levels to cover above and below the center (max 6)
    #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
    pub radius: i64,

    /// Parallel downloads
    #[arg(long, default_value_t = DEFAULT_PREWARM_CONCURRENCY)]
    pub concurrency: usize,
}

impl PrewarmArgs {
    fn to_request(&self) -> PrewarmRequest {
        PrewarmRequest::new(
            self.provider.clone(),
            Bounds::new(self.north, self.south, self.east, self.west),
        )
        .with_center_zoom(self.zoom)
        .with_zoom_radius(self.radius)
    }
}

/// Run the prewarm command.
pub fn run(args: PrewarmArgs, overrides: &ConfigOverrides) -> Result<(), CliError> {
    let runner = CliRunner::new(overrides)?;
    runner.log_startup("prewarm");

    let store = runner.create_store()?;
    let orchestrator = PrewarmOrchestrator::new(store).with_concurrency(args.concurrency);
    let request = args.to_request();

    let cancellation = CancellationToken::new();
    cancel_on_ctrlc(cancellation.clone(), "Cancelling prewarm...")?;

    println!(
        "Prewarming {} around zoom {} (radius {})...",
        request.provider_key, request.center_zoom, request.zoom_radius
    );

    let started = Instant::now();
    let runtime = runner.runtime()?;
    let result = runtime.block_on(orchestrator.prewarm_view(&request, cancellation))?;

    println!();
    println!("Prewarm complete in {:.1}s", started.elapsed().as_secs_f64());
    println!("  Provider: {}", result.provider_key);
    println!("  Zoom:     {}-{}", result.zoom_min, result.zoom_max);
    println!("  Tiles:    {}", result.total);
    println!("  Cached:   {}", result.ok);
    if result.failed > 0 {
        println!("  Failed:   {}", result.failed);
    }

    Ok(())
}
