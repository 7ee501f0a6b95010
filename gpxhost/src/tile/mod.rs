//! Single-tile cache-or-fetch.
//!
//! [`TileStore`] consults the disk cache, falls back to the provider's
//! upstream server with bounded retries and records hit/miss/error counts.
//!
//! ```ignore
//! use gpxhost::tile::TileStore;
//!
//! let store = TileStore::new(client, registry, config.service_config());
//! let path = store.get_tile("openstreetmap", "12", "2048", "1361.png").await?;
//! ```

mod error;
mod store;

pub use error::{ErrorClass, TileError};
pub use store::TileStore;
