//! gpx-self-host command-line interface.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use commands::cache::CacheAction;
use commands::prewarm::PrewarmArgs;
use commands::serve::ServeArgs;
use commands::tile::TileArgs;
use error::CliError;
use runner::ConfigOverrides;

#[derive(Parser)]
#[command(name = "gpx-self-host")]
#[command(about = "Self-hosted GPX viewer backend with an offline map tile cache", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options that override values from the config file.
#[derive(Debug, Args)]
struct GlobalArgs {
    /// Config file (default: ~/.gpxhost/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tile cache root directory
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Serve only cached tiles, never download
    #[arg(long, global = true)]
    offline: bool,

    /// Upstream request timeout in seconds
    #[arg(long, global = true)]
    client_timeout: Option<u64>,

    /// Download attempts per tile
    #[arg(long, global = true)]
    max_retries: Option<u32>,
}

impl From<GlobalArgs> for ConfigOverrides {
    fn from(args: GlobalArgs) -> Self {
        Self {
            config_path: args.config,
            cache_dir: args.cache_dir,
            offline: args.offline,
            client_timeout: args.client_timeout,
            max_retries: args.max_retries,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the tile and prewarm HTTP API
    Serve(ServeArgs),

    /// Download every tile covering a map view
    Prewarm(PrewarmArgs),

    /// Fetch one tile through the cache and print its path
    Tile(TileArgs),

    /// List configured tile providers
    Providers,

    /// Inspect the tile cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let overrides = ConfigOverrides::from(cli.global);

    match cli.command {
        Commands::Serve(args) => commands::serve::run(args, &overrides),
        Commands::Prewarm(args) => commands::prewarm::run(args, &overrides),
        Commands::Tile(args) => commands::tile::run(args, &overrides),
        Commands::Providers => commands::providers::run(&overrides),
        Commands::Cache { action } => commands::cache::run(action, &overrides),
    }
}
