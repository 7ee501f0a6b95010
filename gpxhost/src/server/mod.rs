//! HTTP API.
//!
//! | Route                              | Purpose                           |
//! |------------------------------------|-----------------------------------|
//! | `GET /tiles/:provider/:z/:x/:y`    | Tile proxy (`:y` is `<row>.<ext>`)|
//! | `GET /api/status`                  | Cache counters                    |
//! | `GET /api/tile-config`             | Providers for map clients         |
//! | `POST /api/prewarm-view`           | Prewarm the tiles of a view       |

mod dto;
mod handlers;
mod state;

use std::future::{Future, IntoFuture};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::cache::{disk_usage, format_size};
use crate::provider::AsyncHttpClient;

pub use dto::{ProviderDto, TileConfigResponse};
pub use state::AppState;

/// Errors that stop the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] io::Error),
}

/// Builds the API router.
pub fn router<C: AsyncHttpClient + 'static>(state: AppState<C>) -> Router {
    Router::new()
        .route("/tiles/:provider/:z/:x/:y", get(handlers::tile::<C>))
        .route("/api/status", get(handlers::status::<C>))
        .route("/api/tile-config", get(handlers::tile_config::<C>))
        .route("/api/prewarm-view", post(handlers::prewarm_view::<C>))
        .with_state(state)
}

/// How long open connections may keep draining after shutdown starts.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Binds `addr` and serves the API until `shutdown` resolves.
pub async fn serve<C, F>(addr: SocketAddr, state: AppState<C>, shutdown: F) -> Result<(), ServerError>
where
    C: AsyncHttpClient + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    log_cache_size(&state).await;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    serve_listener(listener, state, shutdown, SHUTDOWN_TIMEOUT).await
}

/// Serves the API on an already bound listener.
///
/// When `shutdown` resolves, running prewarms are cancelled and open
/// connections get `drain_timeout` to finish before they are dropped.
pub async fn serve_listener<C, F>(
    listener: TcpListener,
    state: AppState<C>,
    shutdown: F,
    drain_timeout: Duration,
) -> Result<(), ServerError>
where
    C: AsyncHttpClient + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr().map_err(ServerError::Serve)?;
    info!(address = %format!("http://{}", local_addr), "Starting server");

    let draining = state.shutdown.clone();
    let signal = async move {
        shutdown.await;
        info!("Shutdown requested; cancelling running prewarms");
        draining.cancel();
    };
    let draining = state.shutdown.clone();

    let server = axum::serve(listener, router(state))
        .with_graceful_shutdown(signal)
        .into_future();

    tokio::select! {
        served = server => served.map_err(ServerError::Serve)?,
        _ = async {
            draining.cancelled().await;
            tokio::time::sleep(drain_timeout).await;
        } => {
            warn!(
                timeout_ms = drain_timeout.as_millis() as u64,
                "Graceful shutdown timed out; dropping open connections"
            );
        }
    }

    info!("Server stopped");
    Ok(())
}

async fn log_cache_size<C: AsyncHttpClient + 'static>(state: &AppState<C>) {
    let cache_dir = state.store.cache_dir().to_path_buf();
    match tokio::task::spawn_blocking(move || disk_usage(&cache_dir)).await {
        Ok(Ok(size)) => info!(size_readable = %format_size(size), "Current cache size"),
        Ok(Err(e)) => warn!(error = %e, "Failed to measure cache size"),
        Err(e) => warn!(error = %e, "Cache size task failed"),
    }
}
