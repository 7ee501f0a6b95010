//! Shared state for HTTP handlers.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::prewarm::PrewarmOrchestrator;
use crate::provider::AsyncHttpClient;
use crate::tile::TileStore;

/// State shared by every request handler.
pub struct AppState<C> {
    pub store: Arc<TileStore<C>>,
    pub prewarm: PrewarmOrchestrator<C>,
    /// Provider map clients select on first load
    pub initial_provider: String,
    /// Cancelled when the server starts shutting down; every prewarm runs
    /// under a child of this token
    pub shutdown: CancellationToken,
}

impl<C: AsyncHttpClient + 'static> AppState<C> {
    pub fn new(store: Arc<TileStore<C>>, initial_provider: impl Into<String>) -> Self {
        let prewarm = PrewarmOrchestrator::new(Arc::clone(&store));
        Self {
            store,
            prewarm,
            initial_provider: initial_provider.into(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_prewarm(mut self, prewarm: PrewarmOrchestrator<C>) -> Self {
        self.prewarm = prewarm;
        self
    }
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            prewarm: self.prewarm.clone(),
            initial_provider: self.initial_provider.clone(),
            shutdown: self.shutdown.clone(),
        }
    }
}
