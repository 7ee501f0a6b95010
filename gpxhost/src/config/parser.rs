//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::{ConfigFile, ConfigFileError};
use crate::provider::{ProviderConfig, ProviderRegistry, DEFAULT_INITIAL_PROVIDER};

/// Prefix of per-provider section names: `[provider.<id>]`.
const PROVIDER_SECTION_PREFIX: &str = "provider.";

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [server] section
    if let Some(section) = ini.section(Some("server")) {
        if let Some(v) = section.get("listen") {
            config.server.listen = parse_value(
                "server",
                "listen",
                v,
                "expected an address like '127.0.0.1:8080'",
            )?;
        }
    }

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.cache.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("offline") {
            config.cache.offline = parse_bool("cache", "offline", v)?;
        }
    }

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("timeout") {
            let timeout: u64 = parse_value(
                "download",
                "timeout",
                v,
                "must be a positive integer (seconds)",
            )?;
            if timeout == 0 {
                return Err(invalid(
                    "download",
                    "timeout",
                    v,
                    "must be a positive integer (seconds)",
                ));
            }
            config.download.timeout = timeout;
        }
        if let Some(v) = section.get("max_retries") {
            config.download.max_retries = parse_value(
                "download",
                "max_retries",
                v,
                "must be a non-negative integer",
            )?;
        }
    }

    // [provider.<id>] sections replace the built-in set
    let mut providers = Vec::new();
    let mut initial = None;
    for (name, section) in ini.iter() {
        let Some(id) = name.and_then(|n| n.strip_prefix(PROVIDER_SECTION_PREFIX)) else {
            continue;
        };
        let section_name = format!("{}{}", PROVIDER_SECTION_PREFIX, id);
        let provider = parse_provider(&section_name, id, section)?;
        if let Some(v) = section.get("initial") {
            if parse_bool(&section_name, "initial", v)? {
                initial = Some(id.to_string());
            }
        }
        providers.push((id.to_string(), provider));
    }

    if !providers.is_empty() {
        let registry = ProviderRegistry::new(providers)?;
        let initial = initial.unwrap_or_else(|| {
            if registry.contains(DEFAULT_INITIAL_PROVIDER) {
                DEFAULT_INITIAL_PROVIDER.to_string()
            } else {
                // Registry is non-empty here
                registry
                    .iter()
                    .next()
                    .map(|(id, _)| id.to_string())
                    .unwrap_or_default()
            }
        });
        config.providers.registry = registry;
        config.providers.initial = initial;
    }

    Ok(config)
}

fn parse_provider(
    section_name: &str,
    id: &str,
    section: &Properties,
) -> Result<ProviderConfig, ConfigFileError> {
    let url_template = section
        .get("url_template")
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigFileError::MissingValue {
            section: section_name.to_string(),
            key: "url_template".to_string(),
        })?;
    let name = section.get("name").map(str::trim).unwrap_or(id);

    let mut provider = ProviderConfig::new(name, url_template);
    if let Some(v) = section.get("tms") {
        provider = provider.with_tms(parse_bool(section_name, "tms", v)?);
    }
    if let Some(v) = section.get("attribution") {
        provider = provider.with_attribution(v.trim());
    }

    let min_zoom = match section.get("min_zoom") {
        Some(v) => parse_value(section_name, "min_zoom", v, "must be a zoom level (0-30)")?,
        None => provider.min_zoom,
    };
    let max_zoom = match section.get("max_zoom") {
        Some(v) => parse_value(section_name, "max_zoom", v, "must be a zoom level (0-30)")?,
        None => provider.max_zoom,
    };

    Ok(provider.with_zoom_range(min_zoom, max_zoom))
}

fn parse_value<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigFileError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(section, key, value, "must be true or false")),
    }
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Expands a leading `~` to the home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
