//! Configuration file handling for ~/.gpxhost/config.ini.
//!
//! Every key is optional; anything missing falls back to the defaults in
//! [`super::defaults`]. Parsing lives in [`super::parser`].

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use super::defaults::{
    default_listen_addr, CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_CACHE_DIR,
    DEFAULT_CLIENT_TIMEOUT_SECS, DEFAULT_MAX_RETRIES,
};
use super::download::DownloadConfig;
use super::service::TileServiceConfig;
use crate::provider::{default_registry, ProviderError, ProviderRegistry, DEFAULT_INITIAL_PROVIDER};

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read or parse the config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// A provider section is missing a required key
    #[error("Invalid configuration: [{section}] is missing '{key}'")]
    MissingValue { section: String, key: String },

    /// Provider definitions failed validation
    #[error("Invalid provider configuration: {0}")]
    Provider(#[from] ProviderError),
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub listen: SocketAddr,
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub directory: PathBuf,
    pub offline: bool,
}

/// `[download]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    /// Per-request timeout in seconds
    pub timeout: u64,
    pub max_retries: u32,
}

/// `[provider.<id>]` sections.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub registry: ProviderRegistry,
    /// Provider selected by map clients on first load
    pub initial: String,
}

/// The whole configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub server: ServerSettings,
    pub cache: CacheSettings,
    pub download: DownloadSettings,
    pub providers: ProviderSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                listen: default_listen_addr(),
            },
            cache: CacheSettings {
                directory: PathBuf::from(DEFAULT_CACHE_DIR),
                offline: false,
            },
            download: DownloadSettings {
                timeout: DEFAULT_CLIENT_TIMEOUT_SECS,
                max_retries: DEFAULT_MAX_RETRIES,
            },
            providers: ProviderSettings {
                registry: default_registry(),
                initial: DEFAULT_INITIAL_PROVIDER.to_string(),
            },
        }
    }
}

impl ConfigFile {
    /// Load configuration from the default path (~/.gpxhost/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Download settings as a [`DownloadConfig`].
    pub fn download_config(&self) -> DownloadConfig {
        DownloadConfig::new()
            .with_timeout(Duration::from_secs(self.download.timeout))
            .with_max_retries(self.download.max_retries)
    }

    /// Settings needed to construct a tile store.
    pub fn service_config(&self) -> TileServiceConfig {
        TileServiceConfig::new(&self.cache.directory)
            .with_offline(self.cache.offline)
            .with_download(self.download_config())
    }
}

/// Get the path to the config directory (~/.gpxhost).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Get the path to the config file (~/.gpxhost/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}
