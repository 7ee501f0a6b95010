//! Provider types and the provider registry

use std::collections::BTreeMap;
use std::fmt;

use crate::coord::MAX_ZOOM;

use super::template::{build_tile_url, validate_template};

/// Errors that can occur while configuring or talking to a tile provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// HTTP request failed before a response was received
    HttpError(String),
    /// URL template is missing a placeholder
    InvalidTemplate { provider: String, reason: String },
    /// Zoom range is inverted or exceeds the supported maximum
    InvalidZoomRange { provider: String, min: u8, max: u8 },
    /// Provider identifier is empty or would escape the cache directory
    InvalidId(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::InvalidTemplate { provider, reason } => {
                write!(f, "Invalid URL template for '{}': {}", provider, reason)
            }
            ProviderError::InvalidZoomRange { provider, min, max } => write!(
                f,
                "Invalid zoom range [{}, {}] for '{}' (max zoom {})",
                min, max, provider, MAX_ZOOM
            ),
            ProviderError::InvalidId(id) => write!(f, "Invalid provider id '{}'", id),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Configuration of one upstream tile provider.
///
/// Immutable once registered.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    /// Display name
    pub name: String,
    /// URL template with `{z}`, `{x}` and `{y}` placeholders
    pub url_template: String,
    /// Row 0 is at the south edge (TMS) instead of the north edge (XYZ)
    pub is_tms: bool,
    /// Attribution shown by map clients
    pub attribution: String,
    /// Lowest zoom level served, inclusive
    pub min_zoom: u8,
    /// Highest zoom level served, inclusive
    pub max_zoom: u8,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            is_tms: false,
            attribution: String::new(),
            min_zoom: 0,
            max_zoom: 19,
        }
    }

    pub fn with_tms(mut self, is_tms: bool) -> Self {
        self.is_tms = is_tms;
        self
    }

    pub fn with_attribution(mut self, attribution: impl Into<String>) -> Self {
        self.attribution = attribution.into();
        self
    }

    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    /// Clamps a zoom level into this provider's range.
    pub fn clamp_zoom(&self, zoom: i64) -> u8 {
        zoom.clamp(i64::from(self.min_zoom), i64::from(self.max_zoom)) as u8
    }

    /// Checks if this provider serves the given zoom level.
    pub fn supports_zoom(&self, zoom: u8) -> bool {
        zoom >= self.min_zoom && zoom <= self.max_zoom
    }

    /// Builds the upstream URL for a tile.
    ///
    /// `y` is the row exactly as the provider expects it; any TMS flip has
    /// already been applied by the caller.
    pub fn tile_url(&self, zoom: u8, x: u32, y: u32) -> String {
        build_tile_url(&self.url_template, zoom, x, y)
    }

    fn validate(&self, id: &str) -> Result<(), ProviderError> {
        if id.is_empty()
            || !id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ProviderError::InvalidId(id.to_string()));
        }
        validate_template(&self.url_template).map_err(|reason| ProviderError::InvalidTemplate {
            provider: id.to_string(),
            reason,
        })?;
        if self.min_zoom > self.max_zoom || self.max_zoom > MAX_ZOOM {
            return Err(ProviderError::InvalidZoomRange {
                provider: id.to_string(),
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        Ok(())
    }
}

/// Immutable set of providers keyed by identifier.
///
/// Built once at startup; lookups are plain map reads and need no locking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, ProviderConfig>,
}

impl ProviderRegistry {
    /// Creates a registry, validating every provider.
    pub fn new<I, K>(providers: I) -> Result<Self, ProviderError>
    where
        I: IntoIterator<Item = (K, ProviderConfig)>,
        K: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (id, config) in providers {
            let id = id.into();
            config.validate(&id)?;
            map.insert(id, config);
        }
        Ok(Self { providers: map })
    }

    /// Looks up a provider by identifier.
    pub fn get(&self, id: &str) -> Option<&ProviderConfig> {
        self.providers.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }

    /// Iterates providers in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProviderConfig)> {
        self.providers.iter().map(|(id, config)| (id.as_str(), config))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
