//! GitHub-backed content source
//!
//! Lists a branch through the git trees API and reads files from the raw
//! content host.

use super::{BinarySource, ContentSource, TextSource, TreeSource};
use crate::config::{FetchConfig, SourceConfig};
use crate::error::{ContentError, FetchError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, warn};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

#[derive(Debug, Deserialize)]
struct TreeListing {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Repository content served by GitHub
pub struct GitHubSource {
    client: reqwest::Client,
    repo: String,
    branch: String,
    token: Option<String>,
    api_base: String,
    raw_root: Url,
    user_agent: String,
    text_timeout: Duration,
}

impl GitHubSource {
    pub fn new(source: &SourceConfig, fetch: &FetchConfig) -> Result<Self, ContentError> {
        if source.repo.split('/').filter(|p| !p.is_empty()).count() != 2 {
            return Err(ContentError::ConfigError(format!(
                "Repository must be given as owner/name, got '{}'",
                source.repo
            )));
        }
        let raw_root = Url::parse(&source.raw_base).map_err(|e| {
            ContentError::ConfigError(format!("Invalid raw base URL {}: {}", source.raw_base, e))
        })?;
        if raw_root.cannot_be_a_base() {
            return Err(ContentError::ConfigError(format!(
                "Raw base URL cannot hold paths: {}",
                source.raw_base
            )));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ContentError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            repo: source.repo.trim_matches('/').to_string(),
            branch: source.branch.clone(),
            token: source
                .token
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            api_base: source.api_base.trim_end_matches('/').to_string(),
            raw_root,
            user_agent: fetch.user_agent.clone(),
            text_timeout: Duration::from_secs(fetch.text_timeout_secs),
        })
    }

    /// Recursive git trees endpoint for the configured branch
    pub fn tree_url(&self) -> String {
        format!(
            "{}/repos/{}/git/trees/{}?recursive=1",
            self.api_base, self.repo, self.branch
        )
    }

    /// Raw content URL for a repository path, each segment percent-encoded
    pub fn raw_url(&self, path: &str) -> String {
        let mut url = self.raw_root.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(self.repo.split('/'))
                .push(&self.branch)
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url.to_string()
    }

    fn api_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(agent) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, agent);
        }
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        if let Some(token) = &self.token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("Configured token is not a valid header value; sending anonymously"),
            }
        }
        headers
    }
}

#[async_trait]
impl TreeSource for GitHubSource {
    async fn list_paths(&self) -> Result<Vec<String>, ContentError> {
        let url = self.tree_url();
        debug!(url = %url, "Requesting repository tree");

        let response = self
            .client
            .get(&url)
            .headers(self.api_headers())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let header = |name: &str| {
                response
                    .headers()
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            };
            let message = describe_listing_failure(
                status,
                header("X-RateLimit-Remaining").as_deref(),
                header("X-RateLimit-Reset").as_deref(),
                self.token.is_some(),
            );
            error!(status = status.as_u16(), message = %message, "Repository tree request failed");
            return Err(ContentError::SourceUnavailable(message));
        }

        let listing: TreeListing = response
            .json()
            .await
            .map_err(|e| ContentError::Decode(format!("Invalid tree listing: {}", e)))?;
        if listing.truncated {
            warn!(entries = listing.tree.len(), "Repository tree listing was truncated");
        }

        Ok(listing
            .tree
            .into_iter()
            .filter(|entry| entry.kind == "blob")
            .map(|entry| entry.path)
            .collect())
    }
}

#[async_trait]
impl TextSource for GitHubSource {
    async fn fetch_text(&self, path: &str) -> Result<String, ContentError> {
        let url = self.raw_url(path);
        let response = self
            .client
            .get(&url)
            .headers(self.api_headers())
            .timeout(self.text_timeout)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ContentError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(ContentError::SourceUnavailable(status_line(status)));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl BinarySource for GitHubSource {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut request = self.client.get(url);
        if let Ok(agent) = HeaderValue::from_str(&self.user_agent) {
            request = request.header(USER_AGENT, agent);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

impl ContentSource for GitHubSource {
    fn asset_url(&self, path: &str) -> String {
        self.raw_url(path)
    }
}

fn status_line(status: StatusCode) -> String {
    format!(
        "HTTP {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )
    .trim_end()
    .to_string()
}

/// Error text for a failed listing request.
///
/// A 403 usually means the anonymous rate limit ran out, so the remaining
/// quota, the reset time and a hint about tokens are appended.
pub fn describe_listing_failure(
    status: StatusCode,
    remaining: Option<&str>,
    reset: Option<&str>,
    has_token: bool,
) -> String {
    let mut message = status_line(status);
    if status != StatusCode::FORBIDDEN {
        return message;
    }
    if let Some(remaining) = remaining.filter(|r| !r.is_empty()) {
        message.push_str(&format!(" | Remaining: {}", remaining));
    }
    if let Some(reset_at) = reset
        .and_then(|r| r.trim().parse::<i64>().ok())
        .and_then(|ts| chrono::DateTime::<chrono::Utc>::from_timestamp(ts, 0))
    {
        let local = reset_at.with_timezone(&chrono::Local);
        message.push_str(&format!(" | Reset: {}", local.format("%H:%M:%S")));
    }
    if has_token {
        message.push_str(" | Suggestion: check that the token is valid.");
    } else {
        message.push_str(" | Suggestion: add a token to increase the limit.");
    }
    message
}
