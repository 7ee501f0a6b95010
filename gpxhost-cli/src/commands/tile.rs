//! Tile command: fetches a single tile through the cache.

use clap::Args;

use crate::error::CliError;
use crate::runner::{CliRunner, ConfigOverrides};

/// Arguments for the tile command.
#[derive(Debug, Args)]
pub struct TileArgs {
    /// Provider id
    pub provider: String,
    /// Zoom level
    pub zoom: String,
    /// Column
    pub x: String,
    /// Row with extension, e.g. `1234.png`
    pub y: String,
}

/// Run the tile command.
pub fn run(args: TileArgs, overrides: &ConfigOverrides) -> Result<(), CliError> {
    let runner = CliRunner::new(overrides)?;
    runner.log_startup("tile");

    let store = runner.create_store()?;
    let runtime = runner.runtime()?;
    let path = runtime.block_on(store.get_tile(&args.provider, &args.zoom, &args.x, &args.y))?;

    println!("{}", path.display());
    Ok(())
}
