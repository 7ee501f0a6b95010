//! Tile store and prewarm errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::cache::{TileKey, TileKeyError};
use crate::coord::Bounds;

/// How a failure should be reported to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The requested thing does not exist (or cannot exist offline)
    NotFound,
    /// The request itself is unacceptable
    Rejected,
    /// Upstream could not deliver after all retries
    Unavailable,
    /// Local failure unrelated to the request
    Internal,
}

/// Errors produced while serving or prewarming tiles.
#[derive(Debug, Error)]
pub enum TileError {
    #[error("Unknown provider '{0}'")]
    UnknownProvider(String),

    #[error("Invalid tile request: {0}")]
    InvalidTile(#[from] TileKeyError),

    /// Offline mode refused a download. `tile` is set for a single-tile
    /// cache miss and empty when a whole operation was refused.
    #[error("{}", offline_message(.tile))]
    OfflineUnavailable { tile: Option<TileKey> },

    #[error("Invalid bounds {0}: every edge must be a finite number")]
    InvalidBounds(Bounds),

    #[error("Requested area too large: {total} tiles exceeds the limit of {max}")]
    TooManyTiles { total: u64, max: u64 },

    #[error("Tile not found upstream: {url}")]
    UpstreamNotFound { url: String },

    #[error("Failed to fetch {url} after {attempts} attempt(s): {reason}")]
    UpstreamFailure {
        url: String,
        attempts: u32,
        /// Status of the last response, if one was received
        status: Option<u16>,
        reason: String,
    },

    #[error("Failed to write cache file {}: {source}", .path.display())]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Prewarm cancelled")]
    Cancelled,
}

fn offline_message(tile: &Option<TileKey>) -> String {
    match tile {
        Some(key) => format!("Tile {} is not cached and offline mode is enabled", key),
        None => "Offline mode is enabled; downloads are disabled".to_string(),
    }
}

impl TileError {
    pub fn class(&self) -> ErrorClass {
        match self {
            TileError::UnknownProvider(_) | TileError::UpstreamNotFound { .. } => {
                ErrorClass::NotFound
            }
            TileError::OfflineUnavailable { tile: Some(_) } => ErrorClass::NotFound,
            TileError::OfflineUnavailable { tile: None }
            | TileError::InvalidTile(_)
            | TileError::InvalidBounds(_)
            | TileError::TooManyTiles { .. } => ErrorClass::Rejected,
            TileError::UpstreamFailure { .. } => ErrorClass::Unavailable,
            TileError::CacheWrite { .. } | TileError::Cancelled => ErrorClass::Internal,
        }
    }
}
