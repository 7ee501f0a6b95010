//! Upstream tile provider abstraction
//!
//! A provider is a remote slippy-map tile server described by a URL template.
//! Providers are registered once at startup in a [`ProviderRegistry`] and
//! fetched through an [`AsyncHttpClient`]:
//!
//! ```ignore
//! use gpxhost::provider::{default_registry, AsyncReqwestClient};
//!
//! let registry = default_registry();
//! let client = AsyncReqwestClient::new()?;
//! let osm = registry.get("openstreetmap").unwrap();
//! let response = client.get(&osm.tile_url(12, 2048, 1361)).await?;
//! ```

mod defaults;
mod http;
mod template;
mod types;

pub use defaults::{default_providers, default_registry, DEFAULT_INITIAL_PROVIDER};
pub use http::{
    AsyncHttpClient, AsyncReqwestClient, HttpResponse, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
pub use template::build_tile_url;
pub use types::{ProviderConfig, ProviderError, ProviderRegistry};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
