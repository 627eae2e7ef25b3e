//! Environment variable source: BULLETIN_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Token variable consulted when no token is configured.
pub const TOKEN_FALLBACK_VAR: &str = "GITHUB_TOKEN";

/// Environment overlay: `BULLETIN_SOURCE__REPO` sets `source.repo`.
pub fn source() -> Environment {
    Environment::with_prefix("BULLETIN")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Add environment variable overlay to builder.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(source()))
}

/// Token from `GITHUB_TOKEN`, if set and non-blank
pub fn fallback_token() -> Option<String> {
    std::env::var(TOKEN_FALLBACK_VAR)
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
