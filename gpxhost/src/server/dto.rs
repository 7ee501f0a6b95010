//! JSON response bodies.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::provider::{ProviderConfig, ProviderRegistry};

/// A provider as exposed to map clients; the URL template stays private.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderDto {
    pub name: String,
    #[serde(rename = "isTMS")]
    pub is_tms: bool,
    pub attribution: String,
    #[serde(rename = "minZoom")]
    pub min_zoom: u8,
    #[serde(rename = "maxZoom")]
    pub max_zoom: u8,
}

impl From<&ProviderConfig> for ProviderDto {
    fn from(provider: &ProviderConfig) -> Self {
        Self {
            name: provider.name.clone(),
            is_tms: provider.is_tms,
            attribution: provider.attribution.clone(),
            min_zoom: provider.min_zoom,
            max_zoom: provider.max_zoom,
        }
    }
}

/// Body of `GET /api/tile-config`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileConfigResponse {
    pub providers: BTreeMap<String, ProviderDto>,
    pub initial: String,
    pub offline: bool,
}

impl TileConfigResponse {
    pub fn new(registry: &ProviderRegistry, initial: &str, offline: bool) -> Self {
        Self {
            providers: registry
                .iter()
                .map(|(id, provider)| (id.to_string(), ProviderDto::from(provider)))
                .collect(),
            initial: initial.to_string(),
            offline,
        }
    }
}
