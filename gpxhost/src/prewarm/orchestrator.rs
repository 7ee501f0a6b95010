//! Worker pool that downloads every tile of a prewarm plan.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::plan::{PrewarmPlan, MAX_TILES_PER_PREWARM};
use super::types::{PrewarmRequest, PrewarmResult};
use crate::cache::TileKey;
use crate::coord::{flip_row, TileCoord};
use crate::provider::AsyncHttpClient;
use crate::tile::{TileError, TileStore};

/// Default number of concurrent prewarm workers.
pub const DEFAULT_PREWARM_CONCURRENCY: usize = 8;

/// Capacity of the queue between the tile producer and the workers.
pub const QUEUE_CAPACITY: usize = 256;

/// Extension used for prewarmed tiles; map clients request `.png` for every
/// provider, so that is what must be on disk.
pub const PREWARM_TILE_EXTENSION: &str = "png";

/// Drives bulk tile downloads through a shared [`TileStore`].
pub struct PrewarmOrchestrator<C> {
    store: Arc<TileStore<C>>,
    concurrency: usize,
    max_tiles: u64,
}

impl<C> Clone for PrewarmOrchestrator<C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            concurrency: self.concurrency,
            max_tiles: self.max_tiles,
        }
    }
}

impl<C: AsyncHttpClient + 'static> PrewarmOrchestrator<C> {
    pub fn new(store: Arc<TileStore<C>>) -> Self {
        Self {
            store,
            concurrency: DEFAULT_PREWARM_CONCURRENCY,
            max_tiles: MAX_TILES_PER_PREWARM,
        }
    }

    /// Set the maximum number of concurrent workers (at least one).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the per-request tile limit.
    pub fn with_max_tiles(mut self, max_tiles: u64) -> Self {
        self.max_tiles = max_tiles;
        self
    }

    pub fn store(&self) -> &Arc<TileStore<C>> {
        &self.store
    }

    /// Downloads every tile covering the requested view.
    ///
    /// Per-tile failures are counted in the result, never propagated. If
    /// `cancellation` fires, the queue is closed, all workers are joined and
    /// [`TileError::Cancelled`] is returned instead of a partial result.
    pub async fn prewarm_view(
        &self,
        request: &PrewarmRequest,
        cancellation: CancellationToken,
    ) -> Result<PrewarmResult, TileError> {
        let start = Instant::now();
        let provider_key = request.provider_key.as_str();

        let Some(provider) = self.store.providers().get(provider_key) else {
            return Err(TileError::UnknownProvider(provider_key.to_string()));
        };
        if self.store.is_offline() {
            return Err(TileError::OfflineUnavailable { tile: None });
        }

        let plan = match PrewarmPlan::build(
            provider,
            &request.bounds,
            request.center_zoom,
            request.zoom_radius,
            self.max_tiles,
        ) {
            Ok(plan) => plan,
            Err(e) => {
                warn!(
                    provider = provider_key,
                    bounds = %request.bounds,
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Prewarm rejected"
                );
                return Err(e);
            }
        };

        info!(
            provider = provider_key,
            zoom_min = plan.zoom_min,
            zoom_max = plan.zoom_max,
            bounds = %plan.bounds,
            total = plan.total,
            "Prewarm started"
        );

        let mut result = PrewarmResult {
            provider_key: provider_key.to_string(),
            zoom_min: plan.zoom_min,
            zoom_max: plan.zoom_max,
            total: plan.total,
            ok: 0,
            failed: 0,
        };

        if plan.total == 0 {
            info!(
                provider = provider_key,
                duration_ms = start.elapsed().as_millis() as u64,
                "Prewarm completed: no tiles"
            );
            return Ok(result);
        }

        let worker_count = (self.concurrency as u64).min(plan.total).max(1) as usize;
        let (tx, rx) = async_channel::bounded::<TileCoord>(QUEUE_CAPACITY);
        let counters = Arc::new(Counters::default());

        let workers: Vec<JoinHandle<()>> = (0..worker_count)
            .map(|_| {
                let worker = Worker {
                    store: Arc::clone(&self.store),
                    provider_key: provider_key.to_string(),
                    is_tms: provider.is_tms,
                    counters: Arc::clone(&counters),
                    cancellation: cancellation.clone(),
                };
                tokio::spawn(worker.run(rx.clone()))
            })
            .collect();
        drop(rx);

        let mut cancelled = false;
        for tile in plan.tiles() {
            if cancellation.is_cancelled() {
                cancelled = true;
                break;
            }
            tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    cancelled = true;
                    break;
                }
                sent = tx.send(tile) => {
                    if sent.is_err() {
                        warn!(provider = provider_key, "Prewarm queue closed early");
                        break;
                    }
                }
            }
        }
        tx.close();
        drop(tx);

        for worker in workers {
            if let Err(e) = worker.await {
                warn!(error = %e, "Prewarm worker panicked");
            }
        }

        result.ok = counters.ok.load(Ordering::Relaxed);
        result.failed = counters.failed.load(Ordering::Relaxed);

        if cancelled || cancellation.is_cancelled() {
            info!(
                provider = provider_key,
                zoom_min = result.zoom_min,
                zoom_max = result.zoom_max,
                total = result.total,
                ok = result.ok,
                failed = result.failed,
                duration_ms = start.elapsed().as_millis() as u64,
                "Prewarm cancelled"
            );
            return Err(TileError::Cancelled);
        }

        // Tiles held by a panicked worker, or never queued because every
        // worker died, are neither ok nor failed yet.
        let unaccounted = result.total.saturating_sub(result.ok + result.failed);
        if unaccounted > 0 {
            warn!(
                provider = provider_key,
                unaccounted = unaccounted,
                "Prewarm tiles lost to worker failure; counting them as failed"
            );
            result.failed += unaccounted;
        }

        info!(
            provider = provider_key,
            zoom_min = result.zoom_min,
            zoom_max = result.zoom_max,
            total = result.total,
            ok = result.ok,
            failed = result.failed,
            duration_ms = start.elapsed().as_millis() as u64,
            "Prewarm completed"
        );

        Ok(result)
    }
}

#[derive(Debug, Default)]
struct Counters {
    ok: AtomicU64,
    failed: AtomicU64,
}

struct Worker<C> {
    store: Arc<TileStore<C>>,
    provider_key: String,
    is_tms: bool,
    counters: Arc<Counters>,
    cancellation: CancellationToken,
}

impl<C: AsyncHttpClient + 'static> Worker<C> {
    async fn run(self, queue: async_channel::Receiver<TileCoord>) {
        while let Ok(tile) = queue.recv().await {
            if self.cancellation.is_cancelled() {
                break;
            }

            let y = if self.is_tms {
                flip_row(tile.y, tile.zoom)
            } else {
                tile.y
            };
            let key = TileKey::new(
                self.provider_key.as_str(),
                tile.zoom,
                tile.x,
                y,
                PREWARM_TILE_EXTENSION,
            );

            match self.store.get_tile_cancellable(&key, &self.cancellation).await {
                Ok(_) => {
                    self.counters.ok.fetch_add(1, Ordering::Relaxed);
                }
                Err(TileError::Cancelled) => break,
                Err(e) => {
                    debug!(tile = %key, error = %e, "Prewarm tile failed");
                    self.counters.failed.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }
}
