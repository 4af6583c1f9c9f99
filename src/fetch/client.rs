//! HTTP client wrapper for handle API requests.
//!
//! This module provides the `HttpClient` struct which owns the pooled reqwest
//! client and exposes the two network stages the retriever retries: building
//! a request and sending it.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, Request, Response};
use tracing::{debug, instrument};

use super::FetchError;
use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use crate::target::Target;
use crate::user_agent;

/// HTTP client for handle API lookups.
///
/// Create once and share between workers; cloning is cheap and keeps the
/// same connection pool.
///
/// # Example
///
/// ```no_run
/// use handlefetch::fetch::HttpClient;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 60 seconds
    /// - Gzip decompression: enabled
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the TLS backend or resolver cannot be initialized.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::new_with_timeouts(
            Duration::from_secs(CONNECT_TIMEOUT_SECS),
            Duration::from_secs(READ_TIMEOUT_SECS),
        )
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the TLS backend or resolver cannot be initialized.
    #[instrument(level = "debug")]
    pub fn new_with_timeouts(
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent::default_user_agent())
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .gzip(true)
            // A 3xx from the handle API is a result in itself.
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        debug!("HTTP client ready");
        Ok(Self { client })
    }

    /// Builds the GET request for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Build`] if the request cannot be constructed.
    pub fn build_request(&self, target: &Target) -> Result<Request, FetchError> {
        self.client
            .get(target.url().clone())
            .header(ACCEPT, "application/json")
            .build()
            .map_err(|e| FetchError::build(target.as_str(), e))
    }

    /// Sends a previously built request.
    ///
    /// Any HTTP status is a successful send; status handling is left to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Timeout`] or [`FetchError::Network`] on transport failure.
    pub async fn execute(&self, request: Request) -> Result<Response, FetchError> {
        let url = request.url().to_string();
        self.client
            .execute(request)
            .await
            .map_err(|e| FetchError::transport(url, e))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_is_get_to_target() {
        let client = HttpClient::new().unwrap();
        let target = Target::from_line("10.1/182", "http://api.example/handles").unwrap();
        let request = client.build_request(&target).unwrap();
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().as_str(), "http://api.example/handles/10.1/182");
        assert_eq!(
            request.headers().get(ACCEPT).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_built_request_can_be_cloned_for_retry() {
        let client = HttpClient::new().unwrap();
        let target = Target::from_line("10.1/182", "http://api.example/handles").unwrap();
        let request = client.build_request(&target).unwrap();
        assert!(request.try_clone().is_some());
    }
}
