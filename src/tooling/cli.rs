//! CLI Tooling
//!
//! Command-line interface over a [`Session`]: print the content tree of a
//! repository or fetch the images of one folder and report how each went.

use crate::config::{BulletinConfig, ConfigLoader};
use crate::logging::LoggingConfig;
use crate::session::{RefreshState, Session};
use crate::source::GitHubSource;
use crate::tooling::format::{format_asset_report, format_tree_text, tree_to_json, AssetRow};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Runtime;
use tracing::info;

/// Bulletin CLI - browse convention-driven content repositories
#[derive(Parser)]
#[command(name = "bulletin")]
#[command(about = "Browse a content repository laid out by naming conventions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (where bulletin.toml is looked up)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Repository as owner/name
    #[arg(long)]
    pub repo: Option<String>,

    /// Branch to read
    #[arg(long)]
    pub branch: Option<String>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the navigable content tree
    Tree {
        /// Folder to start from (slash-separated raw names)
        #[arg(long)]
        path: Option<String>,
        /// Include hidden folders
        #[arg(long)]
        all: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Download the images of a folder and report their status
    Assets {
        /// Folder to load; defaults to the landing folder
        #[arg(long)]
        path: Option<String>,
    },
}

impl Cli {
    /// Logging settings from the config file with command-line overrides applied
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

/// Load configuration for a CLI invocation and apply `--repo`/`--branch`.
pub fn load_config(cli: &Cli) -> anyhow::Result<BulletinConfig> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ConfigLoader::load(&cli.workspace).context("Failed to load configuration")?,
    };
    if let Some(repo) = &cli.repo {
        config.source.repo = repo.clone();
    }
    if let Some(branch) = &cli.branch {
        config.source.branch = branch.clone();
    }
    Ok(config)
}

/// Runtime and session for one CLI invocation
pub struct CliContext {
    runtime: Runtime,
    session: Session,
}

impl CliContext {
    pub fn new(config: BulletinConfig) -> anyhow::Result<Self> {
        if config.source.repo.trim().is_empty() {
            bail!("No repository configured; pass --repo owner/name or set source.repo");
        }
        let runtime = Runtime::new().context("Failed to start async runtime")?;
        let source = Arc::new(GitHubSource::new(&config.source, &config.fetch)?);
        let session = {
            let _guard = runtime.enter();
            Session::new(config, source)?
        };
        Ok(Self { runtime, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn execute(&self, command: &Commands) -> anyhow::Result<String> {
        let started = Instant::now();
        let state = self.runtime.block_on(self.session.refresh().join());
        if let RefreshState::Failed(e) = state {
            bail!("Could not load content: {}", e);
        }
        info!(duration_ms = started.elapsed().as_millis(), "Content loaded");

        match command {
            Commands::Tree { path, all, format } => self.tree(path.as_deref(), *all, format),
            Commands::Assets { path } => self.assets(path.as_deref()),
        }
    }

    fn tree(&self, path: Option<&str>, all: bool, format: &str) -> anyhow::Result<String> {
        let tree = self.session.tree();
        let tree = tree.read();
        let start = match path {
            Some(path) => tree
                .find_path(path)
                .with_context(|| format!("No folder at '{}'", path))?,
            None => tree.root(),
        };
        match format {
            "json" => Ok(serde_json::to_string_pretty(&tree_to_json(&tree, start))?),
            "text" => Ok(format_tree_text(&tree, start, all)),
            other => bail!("Unknown format '{}' (expected text or json)", other),
        }
    }

    fn assets(&self, path: Option<&str>) -> anyhow::Result<String> {
        let node = match path {
            Some(path) => self.session.navigate_to(path)?,
            None => self.session.current(),
        };
        let requested = self.session.request_node_assets(node);
        info!(requested, "Fetching images");
        self.runtime.block_on(self.session.queue().wait_idle());

        let paths: Vec<String> = {
            let tree = self.session.tree();
            let tree = tree.read();
            let node = tree.node(node);
            node.image_paths
                .iter()
                .chain(node.posts.iter().flat_map(|p| p.image_paths.iter()))
                .cloned()
                .collect()
        };
        let rows: Vec<AssetRow> = paths
            .into_iter()
            .map(|path| {
                let url = self.session.asset_url(&path);
                AssetRow {
                    status: self.session.queue().status(&url),
                    dimensions: self
                        .session
                        .queue()
                        .cached(&url)
                        .map(|image| (image.width, image.height)),
                    path,
                }
            })
            .collect();
        Ok(format_asset_report(&rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "bulletin",
            "--repo",
            "owner/content",
            "--log-level",
            "debug",
            "tree",
            "--path",
            "B",
            "--all",
        ])
        .unwrap();
        assert_eq!(cli.repo.as_deref(), Some("owner/content"));
        match cli.command {
            Commands::Tree { path, all, format } => {
                assert_eq!(path.as_deref(), Some("B"));
                assert!(all);
                assert_eq!(format, "text");
            }
            _ => panic!("expected tree command"),
        }
    }

    #[test]
    fn test_logging_overrides() {
        let cli = Cli::try_parse_from(["bulletin", "--log-output", "file", "assets"]).unwrap();
        let merged = cli.logging_config(&LoggingConfig::default());
        assert_eq!(merged.output, "file");
        assert_eq!(merged.level, "info");
    }

    #[test]
    fn test_context_requires_repo() {
        assert!(CliContext::new(BulletinConfig::default()).is_err());
    }
}
