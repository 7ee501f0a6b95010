//! HTTP request handlers.

use std::path::Path as FsPath;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use super::dto::TileConfigResponse;
use super::state::AppState;
use crate::prewarm::PrewarmRequest;
use crate::provider::AsyncHttpClient;
use crate::tile::{ErrorClass, TileError};

const NO_STORE: [(header::HeaderName, &str); 1] = [(header::CACHE_CONTROL, "no-store")];

/// `GET /tiles/:provider/:z/:x/:y` where the last segment is `<row>.<ext>`.
pub async fn tile<C: AsyncHttpClient + 'static>(
    State(state): State<AppState<C>>,
    Path((provider, zoom, x, y_with_extension)): Path<(String, String, String, String)>,
) -> Response {
    let path = match state
        .store
        .get_tile(&provider, &zoom, &x, &y_with_extension)
        .await
    {
        Ok(path) => path,
        Err(e) => return tile_error_response(&e),
    };

    match tokio::fs::read(&path).await {
        Ok(body) => (
            [(header::CONTENT_TYPE, content_type_for(&path))],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read cached tile");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read cached tile").into_response()
        }
    }
}

fn tile_error_response(err: &TileError) -> Response {
    let (status, message) = match err {
        TileError::UnknownProvider(_) => (StatusCode::NOT_FOUND, "Unknown provider"),
        TileError::OfflineUnavailable { .. } => {
            (StatusCode::NOT_FOUND, "Tile not available offline")
        }
        TileError::UpstreamNotFound { .. } => (StatusCode::NOT_FOUND, "Tile not found on upstream"),
        TileError::InvalidTile(_) => (StatusCode::BAD_REQUEST, "Invalid tile request"),
        other => match other.class() {
            ErrorClass::NotFound => (StatusCode::NOT_FOUND, "Tile not found"),
            ErrorClass::Rejected => (StatusCode::BAD_REQUEST, "Invalid tile request"),
            ErrorClass::Unavailable => (StatusCode::BAD_GATEWAY, "Failed to fetch tile"),
            ErrorClass::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to store tile"),
        },
    };
    (status, message).into_response()
}

fn content_type_for(path: &FsPath) -> HeaderValue {
    let content_type = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("pbf") | Some("mvt") => "application/x-protobuf",
        _ => "application/octet-stream",
    };
    HeaderValue::from_static(content_type)
}

/// `GET /api/status`
pub async fn status<C: AsyncHttpClient + 'static>(
    State(state): State<AppState<C>>,
) -> impl IntoResponse {
    (NO_STORE, Json(state.store.stats()))
}

/// `GET /api/tile-config`
pub async fn tile_config<C: AsyncHttpClient + 'static>(
    State(state): State<AppState<C>>,
) -> impl IntoResponse {
    let body = TileConfigResponse::new(
        state.store.providers(),
        &state.initial_provider,
        state.store.is_offline(),
    );
    (NO_STORE, Json(body))
}

/// `POST /api/prewarm-view`
///
/// The prewarm is cancelled if the client goes away before it finishes.
pub async fn prewarm_view<C: AsyncHttpClient + 'static>(
    State(state): State<AppState<C>>,
    body: Bytes,
) -> Response {
    let request: PrewarmRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Rejected prewarm request body");
            return (StatusCode::BAD_REQUEST, "Invalid JSON body").into_response();
        }
    };
    if request.provider_key.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing providerKey").into_response();
    }

    // Dropping this handler (client disconnect) drops the guard and stops
    // the spawned workers. Server shutdown cancels the parent.
    let cancellation = state.shutdown.child_token();
    let _guard = cancellation.clone().drop_guard();

    match state.prewarm.prewarm_view(&request, cancellation).await {
        Ok(result) => (NO_STORE, Json(result)).into_response(),
        Err(e) => {
            let (status, message) = match e {
                TileError::UnknownProvider(_) => (StatusCode::NOT_FOUND, "Unknown provider"),
                TileError::OfflineUnavailable { .. } => {
                    (StatusCode::CONFLICT, "Server is in offline mode")
                }
                TileError::TooManyTiles { .. } => {
                    (StatusCode::BAD_REQUEST, "Requested area too large")
                }
                TileError::Cancelled => {
                    (StatusCode::SERVICE_UNAVAILABLE, "Prewarm cancelled")
                }
                TileError::InvalidBounds(_) => (StatusCode::BAD_REQUEST, "Invalid bounds"),
                _ => (StatusCode::BAD_GATEWAY, "Failed to prewarm tiles"),
            };
            (status, message).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    use tempfile::TempDir;

    use crate::cache::{TileKey, TileKeyError};
    use crate::config::TileServiceConfig;
    use crate::provider::{MockAsyncHttpClient, ProviderConfig, ProviderRegistry};
    use crate::tile::TileStore;

    #[test]
    fn test_content_type_for() {
        assert_eq!(
            content_type_for(&PathBuf::from("a/1.png")),
            HeaderValue::from_static("image/png")
        );
        assert_eq!(
            content_type_for(&PathBuf::from("a/1.JPG")),
            HeaderValue::from_static("image/jpeg")
        );
        assert_eq!(
            content_type_for(&PathBuf::from("a/1.bin")),
            HeaderValue::from_static("application/octet-stream")
        );
    }

    #[test]
    fn test_tile_error_status() {
        let cases = [
            (
                TileError::UnknownProvider("x".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                TileError::OfflineUnavailable {
                    tile: Some(TileKey::new("osm", 1, 0, 0, "png")),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                TileError::UpstreamNotFound {
                    url: "http://h".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                TileError::InvalidTile(TileKeyError::Zoom("z".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (
                TileError::UpstreamFailure {
                    url: "http://h".to_string(),
                    attempts: 3,
                    status: Some(500),
                    reason: "upstream status 500".to_string(),
                },
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(tile_error_response(&err).status(), expected, "{}", err);
        }
    }

    fn slow_state(temp: &TempDir) -> AppState<MockAsyncHttpClient> {
        let registry = ProviderRegistry::new([(
            "osm",
            ProviderConfig::new("OSM", "http://upstream.test/{z}/{x}/{y}.png"),
        )])
        .unwrap();
        let client = MockAsyncHttpClient::ok(b"x").with_delay(Duration::from_millis(100));
        let store = TileStore::new(client, registry, TileServiceConfig::new(temp.path()));
        AppState::new(Arc::new(store), "osm")
    }

    fn large_view_body() -> Bytes {
        Bytes::from_static(
            br#"{"providerKey": "osm", "bounds": {"north": 60, "south": 50, "east": 30, "west": 20}, "centerZoom": 9}"#,
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dropped_request_cancels_prewarm() {
        let temp = TempDir::new().unwrap();
        let state = slow_state(&temp);
        let store = Arc::clone(&state.store);

        // The timeout drops the handler future, as a client disconnect does.
        let outcome = tokio::time::timeout(
            Duration::from_millis(250),
            prewarm_view(State(state), large_view_body()),
        )
        .await;
        assert!(outcome.is_err(), "prewarm finished before the drop");

        tokio::time::sleep(Duration::from_millis(50)).await;
        let after_drop = store.client().request_count();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(after_drop > 0);
        assert_eq!(store.client().request_count(), after_drop);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_server_shutdown_cancels_prewarm() {
        let temp = TempDir::new().unwrap();
        let state = slow_state(&temp);
        let store = Arc::clone(&state.store);
        let shutdown = state.shutdown.clone();

        let handler = tokio::spawn(prewarm_view(State(state), large_view_body()));
        tokio::time::sleep(Duration::from_millis(250)).await;
        shutdown.cancel();

        let response = tokio::time::timeout(Duration::from_secs(1), handler)
            .await
            .expect("prewarm ignored shutdown")
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let after_shutdown = store.client().request_count();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(store.client().request_count(), after_shutdown);
    }
}
