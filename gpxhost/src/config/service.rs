//! Tile service configuration.

use std::path::{Path, PathBuf};

use super::defaults::DEFAULT_CACHE_DIR;
use super::download::DownloadConfig;

/// Everything a tile store needs besides its providers and HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileServiceConfig {
    cache_dir: PathBuf,
    offline: bool,
    download: DownloadConfig,
}

impl TileServiceConfig {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            offline: false,
            download: DownloadConfig::default(),
        }
    }

    /// Serve from the cache only; never contact upstream servers.
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn with_download(mut self, download: DownloadConfig) -> Self {
        self.download = download;
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn offline(&self) -> bool {
        self.offline
    }

    pub fn download(&self) -> &DownloadConfig {
        &self.download
    }
}

impl Default for TileServiceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_DIR)
    }
}
