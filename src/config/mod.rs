//! Configuration
//!
//! Layered configuration: built-in defaults, the global config file, the
//! workspace `bulletin.toml`, then `BULLETIN_*` environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;

use crate::logging::LoggingConfig;
use crate::tree::builder::DEFAULT_EXCLUDE_PREFIX;
use serde::{Deserialize, Serialize};

/// Workspace config file name
pub const WORKSPACE_CONFIG_FILE: &str = "bulletin.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulletinConfig {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the content tree comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Repository as `owner/name`
    #[serde(default)]
    pub repo: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    /// Personal access token; falls back to `GITHUB_TOKEN`
    #[serde(default)]
    pub token: Option<String>,

    /// Listing prefix never treated as content; empty disables exclusion
    #[serde(default = "default_exclude_prefix")]
    pub exclude_prefix: Option<String>,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_raw_base")]
    pub raw_base: String,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_exclude_prefix() -> Option<String> {
    Some(DEFAULT_EXCLUDE_PREFIX.to_string())
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_raw_base() -> String {
    "https://raw.githubusercontent.com".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            repo: String::new(),
            branch: default_branch(),
            token: None,
            exclude_prefix: default_exclude_prefix(),
            api_base: default_api_base(),
            raw_base: default_raw_base(),
        }
    }
}

/// Per-request behavior of the fetchers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Abort an asset download after this many seconds; 0 disables the limit
    #[serde(default = "default_asset_timeout")]
    pub asset_timeout_secs: u64,

    /// Timeout for button descriptor reads
    #[serde(default = "default_text_timeout")]
    pub text_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_asset_timeout() -> u64 {
    30
}

fn default_text_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("bulletin/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            asset_timeout_secs: default_asset_timeout(),
            text_timeout_secs: default_text_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    pub fn asset_timeout(&self) -> Option<std::time::Duration> {
        (self.asset_timeout_secs > 0).then(|| std::time::Duration::from_secs(self.asset_timeout_secs))
    }
}
