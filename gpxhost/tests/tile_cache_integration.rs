//! Integration tests for the tile cache against a real HTTP upstream.
//!
//! A local axum server stands in for the tile provider so the whole path is
//! exercised: reqwest client, retry loop, cache files and the HTTP API.
//!
//! Run with: `cargo test --test tile_cache_integration`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use gpxhost::config::{DownloadConfig, TileServiceConfig};
use gpxhost::coord::Bounds;
use gpxhost::prewarm::{PrewarmOrchestrator, PrewarmRequest};
use gpxhost::provider::{AsyncReqwestClient, ProviderConfig, ProviderRegistry};
use gpxhost::server::{router, AppState};
use gpxhost::tile::{TileError, TileStore};

// ============================================================================
// Fake upstream
// ============================================================================

/// Column values that make the fake upstream misbehave.
const COLUMN_NOT_FOUND: u32 = 404;
const COLUMN_BROKEN: u32 = 500;
const COLUMN_FLAKY: u32 = 503;
const COLUMN_SLOW: u32 = 408;

#[derive(Default)]
struct Upstream {
    requests: AtomicUsize,
    flaky_failures: AtomicUsize,
    paths: parking_lot::Mutex<Vec<String>>,
}

async fn upstream_tile(
    State(upstream): State<Arc<Upstream>>,
    Path((z, x, y)): Path<(u32, u32, String)>,
) -> Response {
    upstream.requests.fetch_add(1, Ordering::SeqCst);
    upstream.paths.lock().push(format!("{}/{}/{}", z, x, y));

    match x {
        COLUMN_NOT_FOUND => StatusCode::NOT_FOUND.into_response(),
        COLUMN_BROKEN => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        COLUMN_FLAKY if upstream.flaky_failures.fetch_add(1, Ordering::SeqCst) == 0 => {
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
        COLUMN_SLOW => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "late".into_response()
        }
        _ => format!("tile {}/{}/{}", z, x, y).into_response(),
    }
}

/// Starts the fake upstream and returns its base URL.
async fn spawn_upstream() -> (String, Arc<Upstream>) {
    let upstream = Arc::new(Upstream::default());
    let app = Router::new()
        .route("/:z/:x/:y", get(upstream_tile))
        .with_state(Arc::clone(&upstream));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), upstream)
}

// ============================================================================
// Helper Functions
// ============================================================================

fn registry(base: &str) -> ProviderRegistry {
    ProviderRegistry::new([
        (
            "xyz",
            ProviderConfig::new("XYZ", format!("{}/{{z}}/{{x}}/{{y}}.png", base)),
        ),
        (
            "tms",
            ProviderConfig::new("TMS", format!("{}/{{z}}/{{x}}/{{y}}.png", base)).with_tms(true),
        ),
    ])
    .unwrap()
}

fn store(base: &str, temp: &TempDir, download: DownloadConfig) -> TileStore<AsyncReqwestClient> {
    let client = AsyncReqwestClient::with_timeout(Duration::from_secs(10)).unwrap();
    let config = TileServiceConfig::new(temp.path()).with_download(download);
    TileStore::new(client, registry(base), config)
}

fn fast_retries() -> DownloadConfig {
    DownloadConfig::new()
        .with_max_retries(3)
        .with_retry_delay(Duration::from_millis(5))
}

// ============================================================================
// TileStore
// ============================================================================

#[tokio::test]
async fn test_downloads_then_serves_from_cache() {
    let (base, upstream) = spawn_upstream().await;
    let temp = TempDir::new().unwrap();
    let store = store(&base, &temp, fast_retries());

    let first = store.get_tile("xyz", "5", "10", "12.png").await.unwrap();
    let second = store.get_tile("xyz", "5", "10", "12.png").await.unwrap();

    assert_eq!(first, temp.path().join("tiles/xyz/5/10/12.png"));
    assert_eq!(first, second);
    assert_eq!(std::fs::read_to_string(&first).unwrap(), "tile 5/10/12.png");
    assert_eq!(upstream.requests.load(Ordering::SeqCst), 1);

    let stats = store.stats();
    assert_eq!(stats.cache_misses, 1);
    assert_eq!(stats.cache_hits, 1);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let (base, upstream) = spawn_upstream().await;
    let temp = TempDir::new().unwrap();
    let store = store(&base, &temp, fast_retries());

    let err = store
        .get_tile("xyz", "5", &COLUMN_NOT_FOUND.to_string(), "1.png")
        .await
        .unwrap_err();

    assert!(matches!(err, TileError::UpstreamNotFound { .. }), "{}", err);
    assert_eq!(upstream.requests.load(Ordering::SeqCst), 1);
    assert!(!temp.path().join("tiles/xyz/5/404/1.png").exists());
}

#[tokio::test]
async fn test_server_error_exhausts_retries() {
    let (base, upstream) = spawn_upstream().await;
    let temp = TempDir::new().unwrap();
    let store = store(&base, &temp, fast_retries());

    let err = store
        .get_tile("xyz", "5", &COLUMN_BROKEN.to_string(), "1.png")
        .await
        .unwrap_err();

    match err {
        TileError::UpstreamFailure {
            attempts, status, ..
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(status, Some(500));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(upstream.requests.load(Ordering::SeqCst), 3);
    assert_eq!(store.stats().cache_errors, 1);
}

#[tokio::test]
async fn test_transient_failure_recovers() {
    let (base, upstream) = spawn_upstream().await;
    let temp = TempDir::new().unwrap();
    let store = store(&base, &temp, fast_retries());

    let path = store
        .get_tile("xyz", "5", &COLUMN_FLAKY.to_string(), "1.png")
        .await
        .unwrap();

    assert!(path.exists());
    assert_eq!(upstream.requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let (base, upstream) = spawn_upstream().await;
    let temp = TempDir::new().unwrap();
    let download = DownloadConfig::new()
        .with_timeout(Duration::from_millis(200))
        .with_max_retries(2)
        .with_retry_delay(Duration::from_millis(5));
    let store = store(&base, &temp, download);

    let err = store
        .get_tile("xyz", "5", &COLUMN_SLOW.to_string(), "1.png")
        .await
        .unwrap_err();

    assert!(
        matches!(err, TileError::UpstreamFailure { attempts: 2, status: None, .. }),
        "{}",
        err
    );
    assert_eq!(upstream.requests.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_leave_one_complete_file() {
    let (base, _upstream) = spawn_upstream().await;
    let temp = TempDir::new().unwrap();
    let store = Arc::new(store(&base, &temp, fast_retries()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.get_tile("xyz", "7", "20", "30.png").await })
        })
        .collect();

    for handle in handles {
        let path = handle.await.unwrap().unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "tile 7/20/30.png");
    }

    let dir = temp.path().join("tiles/xyz/7/20");
    let entries: Vec<_> = std::fs::read_dir(dir).unwrap().collect();
    assert_eq!(entries.len(), 1, "temporary files must not remain");
}

// ============================================================================
// Prewarm
// ============================================================================

#[tokio::test]
async fn test_prewarm_requests_flipped_rows_for_tms() {
    let (base, upstream) = spawn_upstream().await;
    let temp = TempDir::new().unwrap();
    let store = Arc::new(store(&base, &temp, fast_retries()));
    let orchestrator = PrewarmOrchestrator::new(store);

    // A small box in the north-east quadrant is tile (1, 0) at zoom 1.
    let request = PrewarmRequest::new("tms", Bounds::new(10.0, 5.0, 10.0, 5.0))
        .with_center_zoom(1)
        .with_zoom_radius(0);
    let result = orchestrator
        .prewarm_view(&request, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.total, 1);
    assert_eq!(result.ok, 1);
    assert_eq!(upstream.paths.lock().as_slice(), ["1/1/1.png"]);
    assert!(temp.path().join("tiles/tms/1/1/1.png").exists());
}

#[tokio::test]
async fn test_prewarm_over_zoom_range() {
    let (base, upstream) = spawn_upstream().await;
    let temp = TempDir::new().unwrap();
    let store = Arc::new(store(&base, &temp, fast_retries()));
    let orchestrator = PrewarmOrchestrator::new(store).with_concurrency(4);

    let request = PrewarmRequest::new("xyz", Bounds::new(10.0, 5.0, 10.0, 5.0))
        .with_center_zoom(2)
        .with_zoom_radius(1);
    let result = orchestrator
        .prewarm_view(&request, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!((result.zoom_min, result.zoom_max), (1, 3));
    assert_eq!(result.total, 3);
    assert_eq!(result.ok, 3);
    assert_eq!(result.failed, 0);
    assert_eq!(upstream.requests.load(Ordering::SeqCst), 3);

    // Second run is served entirely from the cache.
    let again = orchestrator
        .prewarm_view(&request, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(again.ok, 3);
    assert_eq!(upstream.requests.load(Ordering::SeqCst), 3);
}

// ============================================================================
// HTTP API
// ============================================================================

async fn spawn_api(store: TileStore<AsyncReqwestClient>) -> String {
    let app = router(AppState::new(Arc::new(store), "xyz"));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_api_proxies_and_caches_tiles() {
    let (upstream_base, upstream) = spawn_upstream().await;
    let temp = TempDir::new().unwrap();
    let api = spawn_api(store(&upstream_base, &temp, fast_retries())).await;

    for _ in 0..2 {
        let response = reqwest::get(format!("{}/tiles/xyz/4/3/2.png", api))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["content-type"], "image/png");
        assert_eq!(response.text().await.unwrap(), "tile 4/3/2.png");
    }
    assert_eq!(upstream.requests.load(Ordering::SeqCst), 1);

    let missing = reqwest::get(format!("{}/tiles/xyz/4/404/2.png", api))
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);

    let status: serde_json::Value = reqwest::get(format!("{}/api/status", api))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["cacheHits"], 1);
    assert_eq!(status["cacheMisses"], 2);
}

#[tokio::test]
async fn test_api_prewarm_view() {
    let (upstream_base, _upstream) = spawn_upstream().await;
    let temp = TempDir::new().unwrap();
    let api = spawn_api(store(&upstream_base, &temp, fast_retries())).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/prewarm-view", api))
        .json(&serde_json::json!({
            "providerKey": "xyz",
            "bounds": {"north": 10.0, "south": 5.0, "east": 10.0, "west": 5.0},
            "centerZoom": 3,
            "zoomRadius": 0
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["providerKey"], "xyz");
    assert_eq!(body["total"], 1);
    assert_eq!(body["ok"], 1);
    assert!(temp.path().join("tiles/xyz/3/4/3.png").exists());
}
