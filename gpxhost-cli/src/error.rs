//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use gpxhost::config::ConfigFileError;
use gpxhost::provider::ProviderError;
use gpxhost::server::ServerError;
use gpxhost::tile::TileError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be loaded
    Config(ConfigFileError),
    /// Invalid command-line arguments
    Usage(String),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Failed to create the HTTP client
    HttpClient(ProviderError),
    /// Tile fetch or prewarm failed
    Tile(TileError),
    /// HTTP server error
    Serve(ServerError),
    /// Failed to install the Ctrl-C handler
    SignalHandler(String),
    /// Failed to read cache statistics
    CacheStats(std::io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Config(_) => {
                eprintln!();
                eprintln!(
                    "Check {} or pass --config <path>.",
                    gpxhost::config::config_file_path().display()
                );
            }
            CliError::Serve(ServerError::Bind { .. }) => {
                eprintln!();
                eprintln!("Common issues:");
                eprintln!("  1. Another process is using the port: try --listen 127.0.0.1:<port>");
                eprintln!("  2. Ports below 1024 need elevated privileges");
            }
            CliError::Tile(TileError::OfflineUnavailable { .. }) => {
                eprintln!();
                eprintln!("Offline mode is enabled; run without --offline to download tiles.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Usage(msg) => write!(f, "{}", msg),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Tile(e) => write!(f, "{}", e),
            CliError::Serve(e) => write!(f, "HTTP server error: {}", e),
            CliError::SignalHandler(msg) => write!(f, "Failed to set signal handler: {}", msg),
            CliError::CacheStats(e) => write!(f, "Failed to read cache statistics: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::HttpClient(e) => Some(e),
            CliError::Tile(e) => Some(e),
            CliError::Serve(e) => Some(e),
            CliError::CacheStats(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<TileError> for CliError {
    fn from(e: TileError) -> Self {
        CliError::Tile(e)
    }
}

impl From<ServerError> for CliError {
    fn from(e: ServerError) -> Self {
        CliError::Serve(e)
    }
}
