//! In-memory content source for tests and offline use

use super::{BinarySource, ContentSource, TextSource, TreeSource};
use crate::error::{ContentError, FetchError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;

const URL_SCHEME: &str = "mem://";

#[derive(Default)]
struct StaticState {
    paths: Vec<String>,
    texts: HashMap<String, String>,
    blobs: HashMap<String, Vec<u8>>,
    listing_error: Option<ContentError>,
    fetches: HashMap<String, usize>,
    slow: HashMap<String, Duration>,
}

/// Content held in memory. Asset URLs take the form `mem://<path>`.
#[derive(Default)]
pub struct StaticSource {
    state: RwLock<StaticState>,
    latency: Option<Duration>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fetch sleeps for `latency` before answering
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fetches of `path` (or asset URL) sleep for `latency` instead
    pub fn with_slow_path(self, path: impl Into<String>, latency: Duration) -> Self {
        self.state.write().slow.insert(path.into(), latency);
        self
    }

    pub fn with_path(self, path: impl Into<String>) -> Self {
        self.state.write().paths.push(path.into());
        self
    }

    pub fn with_paths<I, S>(self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .write()
            .paths
            .extend(paths.into_iter().map(Into::into));
        self
    }

    /// Register a text file; it is also added to the listing
    pub fn with_text(self, path: impl Into<String>, text: impl Into<String>) -> Self {
        let path = path.into();
        {
            let mut state = self.state.write();
            state.paths.push(path.clone());
            state.texts.insert(path, text.into());
        }
        self
    }

    /// Register asset bytes under `path`; it is also added to the listing
    pub fn with_blob(self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        let path = path.into();
        {
            let mut state = self.state.write();
            state.paths.push(path.clone());
            state.blobs.insert(path, bytes);
        }
        self
    }

    /// Make `list_paths` fail with `error`
    pub fn with_listing_error(self, error: ContentError) -> Self {
        self.state.write().listing_error = Some(error);
        self
    }

    pub fn set_listing_error(&self, error: Option<ContentError>) {
        self.state.write().listing_error = error;
    }

    /// Number of binary fetches started for `url`
    pub fn fetch_count(&self, url: &str) -> usize {
        self.state.read().fetches.get(url).copied().unwrap_or(0)
    }

    async fn pause(&self, key: &str) {
        let latency = self.state.read().slow.get(key).copied().or(self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl TreeSource for StaticSource {
    async fn list_paths(&self) -> Result<Vec<String>, ContentError> {
        self.pause("").await;
        let state = self.state.read();
        match &state.listing_error {
            Some(error) => Err(error.clone()),
            None => Ok(state.paths.clone()),
        }
    }
}

#[async_trait]
impl TextSource for StaticSource {
    async fn fetch_text(&self, path: &str) -> Result<String, ContentError> {
        self.pause(path).await;
        self.state
            .read()
            .texts
            .get(path)
            .cloned()
            .ok_or_else(|| ContentError::NotFound(path.to_string()))
    }
}

#[async_trait]
impl BinarySource for StaticSource {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        *self
            .state
            .write()
            .fetches
            .entry(url.to_string())
            .or_insert(0) += 1;
        self.pause(url).await;

        let path = url.strip_prefix(URL_SCHEME).unwrap_or(url);
        self.state
            .read()
            .blobs
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                code: 404,
                reason: "Not Found".to_string(),
            })
    }
}

impl ContentSource for StaticSource {
    fn asset_url(&self, path: &str) -> String {
        format!("{}{}", URL_SCHEME, path)
    }
}
