//! Cache-or-fetch tile store.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::error::TileError;
use crate::cache::{CacheStats, CacheStatsSnapshot, TileKey};
use crate::config::TileServiceConfig;
use crate::provider::{AsyncHttpClient, ProviderRegistry};

/// Distinguishes temporary files written concurrently by this process.
static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Serves tiles from the disk cache, downloading misses from upstream.
///
/// One store owns its counters; clone an `Arc<TileStore<_>>` to share it
/// between request handlers and prewarm workers.
pub struct TileStore<C> {
    client: C,
    providers: ProviderRegistry,
    config: TileServiceConfig,
    stats: CacheStats,
}

impl<C: AsyncHttpClient> TileStore<C> {
    pub fn new(client: C, providers: ProviderRegistry, config: TileServiceConfig) -> Self {
        Self {
            client,
            providers,
            config,
            stats: CacheStats::new(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn config(&self) -> &TileServiceConfig {
        &self.config
    }

    pub fn is_offline(&self) -> bool {
        self.config.offline()
    }

    pub fn cache_dir(&self) -> &Path {
        self.config.cache_dir()
    }

    /// Snapshot of the hit/miss/error counters.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    /// Returns the cached path of a tile given raw request segments.
    ///
    /// `y_with_extension` is `<row>.<ext>`; the extension is kept for the
    /// cache file name and stripped from the upstream URL.
    pub async fn get_tile(
        &self,
        provider_id: &str,
        zoom: &str,
        x: &str,
        y_with_extension: &str,
    ) -> Result<PathBuf, TileError> {
        if !self.providers.contains(provider_id) {
            self.stats.record_error();
            return Err(TileError::UnknownProvider(provider_id.to_string()));
        }

        let key = match TileKey::parse(provider_id, zoom, x, y_with_extension) {
            Ok(key) => key,
            Err(e) => {
                self.stats.record_error();
                return Err(e.into());
            }
        };

        self.get_tile_by_key(&key).await
    }

    /// Returns the cached path of `key`, downloading it on a miss.
    pub async fn get_tile_by_key(&self, key: &TileKey) -> Result<PathBuf, TileError> {
        self.get_tile_cancellable(key, &CancellationToken::new()).await
    }

    /// Like [`get_tile_by_key`](Self::get_tile_by_key), but an in-flight
    /// download (including its retry delays) is abandoned as soon as
    /// `cancellation` fires, returning [`TileError::Cancelled`].
    pub async fn get_tile_cancellable(
        &self,
        key: &TileKey,
        cancellation: &CancellationToken,
    ) -> Result<PathBuf, TileError> {
        let Some(provider) = self.providers.get(&key.provider) else {
            self.stats.record_error();
            return Err(TileError::UnknownProvider(key.provider.clone()));
        };

        let path = key.path_in(self.config.cache_dir());

        if is_cached(&path).await {
            info!(path = %path.display(), "Cache hit");
            self.stats.record_hit();
            return Ok(path);
        }
        self.stats.record_miss();

        if self.config.offline() {
            warn!(path = %path.display(), "Offline mode enabled; skipping download");
            self.stats.record_error();
            return Err(TileError::OfflineUnavailable {
                tile: Some(key.clone()),
            });
        }

        let url = provider.tile_url(key.zoom, key.x, key.y);
        info!(path = %path.display(), download_url = %url, "Cache miss");

        let body = match self.fetch_with_retry(&url, cancellation).await {
            Ok(body) => body,
            Err(TileError::Cancelled) => {
                debug!(path = %path.display(), "Download cancelled");
                return Err(TileError::Cancelled);
            }
            Err(e) => {
                self.stats.record_error();
                return Err(e);
            }
        };

        if let Err(source) = write_tile(&path, &body).await {
            error!(path = %path.display(), error = %source, "Failed to write tile to cache");
            self.stats.record_error();
            return Err(TileError::CacheWrite { path, source });
        }

        debug!(path = %path.display(), bytes = body.len(), "Tile cached");
        Ok(path)
    }

    /// Downloads `url`, retrying everything except `404`.
    async fn fetch_with_retry(
        &self,
        url: &str,
        cancellation: &CancellationToken,
    ) -> Result<Bytes, TileError> {
        let download = self.config.download();
        let attempts = download.attempts();
        let mut last_status = None;
        let mut last_reason = String::new();

        for attempt in 1..=attempts {
            let outcome = tokio::select! {
                biased;
                _ = cancellation.cancelled() => return Err(TileError::Cancelled),
                outcome = tokio::time::timeout(download.timeout(), self.client.get(url)) => outcome,
            };

            match outcome {
                Ok(Ok(response)) if response.is_ok() => return Ok(response.body),
                Ok(Ok(response)) if response.status == 404 => {
                    warn!(url = url, "Upstream returned 404");
                    return Err(TileError::UpstreamNotFound {
                        url: url.to_string(),
                    });
                }
                Ok(Ok(response)) => {
                    last_status = Some(response.status);
                    last_reason = format!("upstream status {}", response.status);
                }
                Ok(Err(e)) => {
                    last_status = None;
                    last_reason = e.to_string();
                }
                Err(_) => {
                    last_status = None;
                    last_reason = format!("timed out after {:?}", download.timeout());
                }
            }

            warn!(
                url = url,
                attempt = attempt,
                attempts = attempts,
                reason = %last_reason,
                "Download attempt failed"
            );

            if attempt < attempts {
                tokio::select! {
                    biased;
                    _ = cancellation.cancelled() => return Err(TileError::Cancelled),
                    _ = tokio::time::sleep(download.retry_delay()) => {}
                }
            }
        }

        error!(
            url = url,
            max_retries = attempts,
            reason = %last_reason,
            "Failed to fetch tile after max attempts"
        );
        Err(TileError::UpstreamFailure {
            url: url.to_string(),
            attempts,
            status: last_status,
            reason: last_reason,
        })
    }
}

async fn is_cached(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Writes `body` next to `path` and renames it into place.
///
/// Readers never see a partial tile; concurrent writers of the same tile
/// each rename a complete file, so one of them wins.
async fn write_tile(path: &Path, body: &[u8]) -> io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "tile path has no parent"))?;
    tokio::fs::create_dir_all(parent).await?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = parent.join(format!(
        ".{}.{}-{}.tmp",
        file_name,
        std::process::id(),
        TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    if let Err(e) = tokio::fs::write(&temp_path, body).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }
    Ok(())
}
