//! Error types for the fetch module.
//!
//! Every variant maps onto one of the status codes a [`Record`](super::Record)
//! can carry, so a failed retrieval never escapes the engine as an error.

use thiserror::Error;

use super::constants::{STATUS_JSON, STATUS_READ, STATUS_REQUEST};

/// Errors that can occur while retrieving one target.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The outbound request could not be constructed.
    #[error("failed to build request for {url}: {source}")]
    Build {
        /// The target address.
        url: String,
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// The built request could not be duplicated for another attempt.
    #[error("request for {url} cannot be cloned for retry")]
    Unclonable {
        /// The target address.
        url: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS, protocol).
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The target address.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before a response arrived.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The target address.
        url: String,
    },

    /// The response body could not be fully read.
    #[error("failed to read response body from {url}: {source}")]
    Body {
        /// The target address.
        url: String,
        /// The underlying read error.
        #[source]
        source: reqwest::Error,
    },

    /// The response body or a nested value is not the expected JSON.
    #[error("invalid JSON from {url}: {source}")]
    Json {
        /// The target address.
        url: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Creates a request construction error.
    pub fn build(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Build {
            url: url.into(),
            source,
        }
    }

    /// Creates an error for a request that cannot be cloned.
    pub fn unclonable(url: impl Into<String>) -> Self {
        Self::Unclonable { url: url.into() }
    }

    /// Creates a transport error, separating timeouts from other failures.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates a body read error.
    pub fn body(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Body {
            url: url.into(),
            source,
        }
    }

    /// Creates a JSON parse error.
    pub fn json(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            url: url.into(),
            source,
        }
    }

    /// Returns the record status code this error is reported as.
    #[must_use]
    pub fn status_code(&self) -> &'static str {
        match self {
            Self::Build { .. }
            | Self::Unclonable { .. }
            | Self::Network { .. }
            | Self::Timeout { .. } => STATUS_REQUEST,
            Self::Body { .. } => STATUS_READ,
            Self::Json { .. } => STATUS_JSON,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn json_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{not json").unwrap_err()
    }

    #[test]
    fn test_timeout_maps_to_request_status() {
        let error = FetchError::Timeout {
            url: "http://example.com".to_string(),
        };
        assert_eq!(error.status_code(), "E_REQ");
        assert!(error.to_string().contains("timeout"));
    }

    #[test]
    fn test_unclonable_maps_to_request_status() {
        let error = FetchError::unclonable("http://example.com");
        assert_eq!(error.status_code(), "E_REQ");
    }

    fn reqwest_error() -> reqwest::Error {
        reqwest::Client::new().get("not a url").build().unwrap_err()
    }

    #[test]
    fn test_body_maps_to_read_status() {
        let error = FetchError::body("http://example.com/h", reqwest_error());
        assert_eq!(error.status_code(), "E_READ");
    }

    #[test]
    fn test_build_maps_to_request_status() {
        let error = FetchError::build("not a url", reqwest_error());
        assert_eq!(error.status_code(), "E_REQ");
        assert!(error.to_string().starts_with("failed to build request"));
    }

    #[test]
    fn test_json_maps_to_json_status() {
        let error = FetchError::json("http://example.com/h", json_error());
        assert_eq!(error.status_code(), "E_JSON");
        assert!(error.to_string().contains("http://example.com/h"));
    }
}
