//! Prewarm request and result types.

use serde::{Deserialize, Serialize};

use crate::coord::Bounds;

/// A request to cache every tile covering a view.
///
/// Missing fields deserialize to zero values; an empty `provider_key` is
/// rejected by the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PrewarmRequest {
    #[serde(default)]
    pub provider_key: String,
    #[serde(default)]
    pub bounds: Bounds,
    #[serde(default)]
    pub center_zoom: i64,
    #[serde(default)]
    pub zoom_radius: i64,
}

impl PrewarmRequest {
    pub fn new(provider_key: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            provider_key: provider_key.into(),
            bounds,
            center_zoom: 0,
            zoom_radius: 0,
        }
    }

    pub fn with_center_zoom(mut self, zoom: i64) -> Self {
        self.center_zoom = zoom;
        self
    }

    pub fn with_zoom_radius(mut self, radius: i64) -> Self {
        self.zoom_radius = radius;
        self
    }
}

/// Outcome of a completed prewarm.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrewarmResult {
    pub provider_key: String,
    pub zoom_min: u8,
    pub zoom_max: u8,
    /// Tiles attempted
    pub total: u64,
    pub ok: u64,
    pub failed: u64,
}
