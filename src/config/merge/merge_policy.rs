//! Built-in defaults every load starts from.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("source.branch", "main")?
        .set_default("fetch.asset_timeout_secs", 30)?
        .set_default("fetch.text_timeout_secs", 10)
}
