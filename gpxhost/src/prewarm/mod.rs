//! Bulk tile prewarming for a map view.
//!
//! A prewarm takes a bounding box, a center zoom and a zoom radius, plans the
//! covering tile set ([`PrewarmPlan`]) and downloads it through a
//! [`TileStore`](crate::tile::TileStore) with a fixed pool of workers
//! ([`PrewarmOrchestrator`]).
//!
//! # Example
//!
//! ```ignore
//! use gpxhost::prewarm::{PrewarmOrchestrator, PrewarmRequest};
//! use tokio_util::sync::CancellationToken;
//!
//! let orchestrator = PrewarmOrchestrator::new(store);
//! let request = PrewarmRequest::new("openstreetmap", bounds)
//!     .with_center_zoom(12)
//!     .with_zoom_radius(2);
//!
//! let token = CancellationToken::new();
//! let result = orchestrator.prewarm_view(&request, token.clone()).await?;
//! println!("{} of {} tiles cached", result.ok, result.total);
//! ```

mod orchestrator;
mod plan;
mod types;

pub use orchestrator::{
    PrewarmOrchestrator, DEFAULT_PREWARM_CONCURRENCY, PREWARM_TILE_EXTENSION, QUEUE_CAPACITY,
};
pub use plan::{resolve_zoom_range, PrewarmPlan, MAX_TILES_PER_PREWARM, MAX_ZOOM_RADIUS};
pub use types::{PrewarmRequest, PrewarmResult};
