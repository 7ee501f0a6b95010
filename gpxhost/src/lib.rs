//! gpxhost - self-hosted GPX viewer backend
//!
//! This library provides the tile cache/proxy behind the GPX viewer: slippy
//! map tiles are fetched from remote providers once, stored as flat files and
//! served from disk afterwards, so tracks stay viewable offline.
//!
//! - [`coord`]: Web Mercator tile math
//! - [`tile`]: single-tile cache-or-fetch ([`tile::TileStore`])
//! - [`prewarm`]: bulk download of a map view ([`prewarm::PrewarmOrchestrator`])
//! - [`server`]: the HTTP API

pub mod cache;
pub mod config;
pub mod coord;
pub mod logging;
pub mod prewarm;
pub mod provider;
pub mod server;
pub mod tile;

/// Version of the gpxhost library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
