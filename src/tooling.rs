//! Tooling Layer
//!
//! The command-line interface and its text/JSON formatting.

pub mod cli;
pub mod format;

pub use cli::{load_config, Cli, CliContext, Commands};
