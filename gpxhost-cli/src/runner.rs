//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and tile store
//! creation to reduce duplication across command handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;
use tracing::info;

use gpxhost::config::ConfigFile;
use gpxhost::logging::{default_log_dir, default_log_file, init_logging, LoggingGuard};
use gpxhost::provider::AsyncReqwestClient;
use gpxhost::tile::TileStore;

use crate::error::CliError;

/// Command-line overrides for values in the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub offline: bool,
    pub client_timeout: Option<u64>,
    pub max_retries: Option<u32>,
}

impl ConfigOverrides {
    /// Loads the config file and applies the overrides on top of it.
    pub fn load(&self) -> Result<ConfigFile, CliError> {
        let mut config = match &self.config_path {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };
        self.apply(&mut config)?;
        Ok(config)
    }

    /// CLI values take precedence over the file.
    pub fn apply(&self, config: &mut ConfigFile) -> Result<(), CliError> {
        if let Some(dir) = &self.cache_dir {
            config.cache.directory = dir.clone();
        }
        if self.offline {
            config.cache.offline = true;
        }
        if let Some(timeout) = self.client_timeout {
            if timeout == 0 {
                return Err(CliError::Usage(
                    "--client-timeout must be at least 1 second".to_string(),
                ));
            }
            config.download.timeout = timeout;
        }
        if let Some(retries) = self.max_retries {
            config.download.max_retries = retries;
        }
        Ok(())
    }
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    _logging_guard: LoggingGuard,
    /// Loaded configuration file with overrides applied
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    pub fn new(overrides: &ConfigOverrides) -> Result<Self, CliError> {
        let config = overrides.load()?;

        let logging_guard = init_logging(&default_log_dir(), default_log_file())
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("gpx-self-host v{}", gpxhost::VERSION);
        info!(
            command = command,
            cache_dir = %self.config.cache.directory.display(),
            offline = self.config.cache.offline,
            "Starting"
        );
    }

    /// Build the multi-threaded runtime commands run on.
    pub fn runtime(&self) -> Result<Runtime, CliError> {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)
    }

    /// Create a tile store backed by the real HTTP client.
    pub fn create_store(&self) -> Result<Arc<TileStore<AsyncReqwestClient>>, CliError> {
        let client =
            AsyncReqwestClient::with_timeout(Duration::from_secs(self.config.download.timeout))
                .map_err(CliError::HttpClient)?;
        Ok(Arc::new(TileStore::new(
            client,
            self.config.providers.registry.clone(),
            self.config.service_config(),
        )))
    }
}
