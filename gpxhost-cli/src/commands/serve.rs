//! Serve command: runs the HTTP API until Ctrl-C or SIGTERM.

use std::net::SocketAddr;

use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::info;

use gpxhost::server::{serve, AppState, SHUTDOWN_TIMEOUT};

use super::common::cancel_on_ctrlc;
use crate::error::CliError;
use crate::runner::{CliRunner, ConfigOverrides};

/// Arguments for the serve command.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides [server] listen)
    #[arg(long)]
    pub listen: Option<SocketAddr>,
}

/// Run the serve command.
pub fn run(args: ServeArgs, overrides: &ConfigOverrides) -> Result<(), CliError> {
    let runner = CliRunner::new(overrides)?;
    runner.log_startup("serve");

    let config = runner.config();
    let addr = args.listen.unwrap_or(config.server.listen);
    let store = runner.create_store()?;
    let state = AppState::new(store, config.providers.initial.clone());

    let shutdown = CancellationToken::new();
    cancel_on_ctrlc(shutdown.clone(), "Shutting down...")?;

    println!("gpx-self-host v{}", gpxhost::VERSION);
    println!("  Listening: http://{}", addr);
    println!("  Cache:     {}", config.cache.directory.display());
    if config.cache.offline {
        println!("  Mode:      offline (cache only)");
    }
    println!();
    println!("Press Ctrl+C to stop.");
    info!(
        drain_timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Shutdown cancels running prewarms and waits for open connections"
    );

    let runtime = runner.runtime()?;
    runtime.block_on(serve(addr, state, async move {
        shutdown.cancelled().await;
    }))?;

    println!("Server stopped.");
    Ok(())
}
