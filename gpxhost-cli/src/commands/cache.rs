//! Cache management CLI commands.

use clap::Subcommand;

use gpxhost::cache::{disk_usage, format_size, TILES_DIR};

use crate::error::CliError;
use crate::runner::{CliRunner, ConfigOverrides};

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Show disk cache statistics
    Stats,
}

/// Run a cache subcommand.
pub fn run(action: CacheAction, overrides: &ConfigOverrides) -> Result<(), CliError> {
    let runner = CliRunner::new(overrides)?;
    let cache_dir = &runner.config().cache.directory;

    match action {
        CacheAction::Stats => {
            println!("Disk cache: {}", cache_dir.display());
            let bytes = disk_usage(&cache_dir.join(TILES_DIR)).map_err(CliError::CacheStats)?;
            println!("  Size: {}", format_size(bytes));
            Ok(())
        }
    }
}
