//! Content Sources
//!
//! Contracts for the three things the core needs from the outside world: a
//! flat path listing, the text of a descriptor file and the bytes behind an
//! asset URL. `GitHubSource` serves them over HTTP; `StaticSource` serves
//! them from memory.

pub mod github;
pub mod memory;

use crate::error::{ContentError, FetchError};
use async_trait::async_trait;

pub use github::GitHubSource;
pub use memory::StaticSource;

/// Provides the full flat listing of content-relevant paths.
#[async_trait]
pub trait TreeSource: Send + Sync {
    async fn list_paths(&self) -> Result<Vec<String>, ContentError>;
}

/// Reads the text content of a repository-relative path.
#[async_trait]
pub trait TextSource: Send + Sync {
    async fn fetch_text(&self, path: &str) -> Result<String, ContentError>;
}

/// Reads raw bytes from an asset URL.
///
/// Cancellation is cooperative: callers drop the returned future.
#[async_trait]
pub trait BinarySource: Send + Sync {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// A source able to serve a whole session.
pub trait ContentSource: TreeSource + TextSource + BinarySource {
    /// URL under which the asset at `path` is fetched
    fn asset_url(&self, path: &str) -> String;
}
