//! MergeService: orchestrates sources, applies merge policy, deserializes to BulletinConfig.

use crate::config::sources::{environment, global_file, workspace_file};
use crate::config::BulletinConfig;
use config::{ConfigError, File, FileFormat};
use std::path::Path;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from workspace and standard sources.
    /// Precedence: global file (lowest) -> workspace file -> environment (highest).
    pub fn load(workspace_root: &Path) -> Result<BulletinConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder)?;

        let config: BulletinConfig = builder.build()?.try_deserialize()?;
        Ok(Self::apply_token_fallback(config))
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<BulletinConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        let builder = environment::add_to_builder(builder)?;

        let config: BulletinConfig = builder.build()?.try_deserialize()?;
        Ok(Self::apply_token_fallback(config))
    }

    fn apply_token_fallback(mut config: BulletinConfig) -> BulletinConfig {
        let configured = config
            .source
            .token
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false);
        if !configured {
            config.source.token = environment::fallback_token();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file_applies_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        fs::write(
            &path,
            r#"
[source]
repo = "owner/content"
exclude_prefix = ""

[fetch]
asset_timeout_secs = 5
"#,
        )
        .unwrap();

        let config = MergeService::load_from_file(&path).unwrap();
        assert_eq!(config.source.repo, "owner/content");
        assert_eq!(config.source.branch, "main");
        assert_eq!(config.source.exclude_prefix.as_deref(), Some(""));
        assert_eq!(config.fetch.asset_timeout_secs, 5);
        assert_eq!(config.fetch.text_timeout_secs, 10);
        assert_eq!(config.source.api_base, "https://api.github.com");
    }

    #[test]
    fn test_load_reads_workspace_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("bulletin.toml"),
            "[source]\nrepo = \"team/news\"\nbranch = \"live\"\n",
        )
        .unwrap();

        let config = MergeService::load(temp.path()).unwrap();
        assert_eq!(config.source.repo, "team/news");
        assert_eq!(config.source.branch, "live");
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = MergeService::load(temp.path()).unwrap();
        assert_eq!(config.source.branch, "main");
        assert_eq!(config.fetch.asset_timeout_secs, 30);
    }
}
