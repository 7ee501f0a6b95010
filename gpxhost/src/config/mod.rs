//! Configuration for gpxhost components.
//!
//! - [`ConfigFile`]: the user's `~/.gpxhost/config.ini`
//! - [`TileServiceConfig`]: what a tile store needs to run
//! - [`DownloadConfig`]: upstream timeout and retry policy
//!
//! ```
//! use gpxhost::config::{ConfigFile, TileServiceConfig};
//!
//! let file = ConfigFile::default();
//! let service: TileServiceConfig = file.service_config();
//! assert!(!service.offline());
//! ```

mod defaults;
mod download;
mod file;
mod parser;
mod service;

pub use defaults::{
    default_listen_addr, DEFAULT_CACHE_DIR, DEFAULT_CLIENT_TIMEOUT_SECS, DEFAULT_LISTEN_PORT,
    DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS,
};
pub use download::DownloadConfig;
pub use file::{
    config_directory, config_file_path, CacheSettings, ConfigFile, ConfigFileError,
    DownloadSettings, ProviderSettings, ServerSettings,
};
pub use service::TileServiceConfig;
