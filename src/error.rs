//! Error types for content sources and asset fetches.

use thiserror::Error;

/// Errors raised while listing or reading repository content.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentError {
    /// The tree source answered, but not with a usable listing (bad status, rate limit)
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The listing body could not be parsed
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for ContentError {
    fn from(err: reqwest::Error) -> Self {
        ContentError::Transport(err.to_string())
    }
}

/// Errors raised by a single binary fetch.
///
/// `reason()` yields the text stored in the per-URL error map.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP {code} {reason}")]
    Status { code: u16, reason: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Cancelled")]
    Cancelled,

    #[error("{0}")]
    Transport(String),
}

impl FetchError {
    /// Human-readable reason as shown next to a failed asset.
    pub fn reason(&self) -> String {
        self.to_string()
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason_matches_http_line() {
        let err = FetchError::Status {
            code: 404,
            reason: "Not Found".to_string(),
        };
        assert_eq!(err.reason(), "HTTP 404 Not Found");
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_timeout_reason() {
        assert_eq!(FetchError::Timeout.reason(), "Request timeout");
        assert!(FetchError::Cancelled.is_cancelled());
    }
}
