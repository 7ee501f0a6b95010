//! Providers command: lists the configured tile providers.

use gpxhost::provider::ProviderRegistry;

use crate::error::CliError;
use crate::runner::{CliRunner, ConfigOverrides};

/// Run the providers command.
pub fn run(overrides: &ConfigOverrides) -> Result<(), CliError> {
    let runner = CliRunner::new(overrides)?;
    let config = runner.config();

    print!(
        "{}",
        format_providers(&config.providers.registry, &config.providers.initial)
    );
    Ok(())
}

fn format_providers(registry: &ProviderRegistry, initial: &str) -> String {
    let mut out = String::new();
    for (id, provider) in registry.iter() {
        let marker = if id == initial { "*" } else { " " };
        let scheme = if provider.is_tms { "tms" } else { "xyz" };
        out.push_str(&format!(
            "{} {:<16} {:<28} {} z{}-{}\n",
            marker, id, provider.name, scheme, provider.min_zoom, provider.max_zoom
        ));
    }
    out
}
