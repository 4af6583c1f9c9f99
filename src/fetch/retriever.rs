//! The per-target retrieval state machine.
//!
//! [`HttpRetriever::retrieve`] is total: every failure is folded into the
//! returned [`Record`]. The stages run in a fixed order:
//!
//! 1. build the request (retried; exhaustion is `E_REQ` with zero elapsed)
//! 2. send it (retried; exhaustion is `E_REQ` with the time spent retrying)
//! 3. read the body (`E_READ`)
//! 4. any HTTP status other than `200 OK` is terminal and reported verbatim
//! 5. parse the envelope and project `URL` values (`E_JSON`)

use std::future::Future;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, instrument, warn};

use super::constants::{STATUS_JSON, STATUS_READ, STATUS_REQUEST};
use super::envelope::HandleResponse;
use super::retry::{RetryDecision, RetryPolicy, classify_error};
use super::{FetchError, HttpClient, Record};
use crate::target::Target;

/// Resolves one target into one record.
///
/// Implementations must never fail: every error is reported through the
/// record's `status` and `locations`.
#[async_trait]
pub trait Retrieve: Send + Sync {
    /// Resolves `target`, always producing a record.
    async fn retrieve(&self, target: &Target) -> Record;
}

/// Retriever backed by the handle HTTP API.
#[derive(Debug, Clone)]
pub struct HttpRetriever {
    client: HttpClient,
    policy: RetryPolicy,
}

impl HttpRetriever {
    /// Creates a retriever sharing `client`'s connection pool.
    #[must_use]
    pub fn new(client: HttpClient, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Runs `operation` until it succeeds or the retry policy gives up.
    async fn with_retry<T, F, Fut>(
        &self,
        target: &Target,
        stage: &'static str,
        mut operation: F,
    ) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let started = Instant::now();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            match self
                .policy
                .should_retry(classify_error(&error), attempt, started.elapsed())
            {
                RetryDecision::Retry {
                    delay,
                    attempt: next_attempt,
                } => {
                    warn!(
                        url = %target,
                        stage,
                        attempt = next_attempt,
                        max_attempts = self.policy.max_attempts(),
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::DoNotRetry { reason } => {
                    debug!(url = %target, stage, attempt, %reason, "giving up");
                    return Err(error);
                }
            }
        }
    }
}

#[async_trait]
impl Retrieve for HttpRetriever {
    #[instrument(skip(self, target), fields(url = %target))]
    async fn retrieve(&self, target: &Target) -> Record {
        let url = target.as_str();

        let request = match self
            .with_retry(target, "build", || async move { self.client.build_request(target) })
            .await
        {
            Ok(request) => request,
            Err(error) => {
                warn!(error = %error, "request construction failed");
                return Record::without_locations(STATUS_REQUEST, url, 0.0);
            }
        };

        let client = &self.client;
        let started = Instant::now();
        let sent = self
            .with_retry(target, "send", move || {
                let attempt = request.try_clone();
                async move {
                    match attempt {
                        Some(request) => client.execute(request).await,
                        None => Err(FetchError::unclonable(url)),
                    }
                }
            })
            .await;
        let elapsed = started.elapsed().as_secs_f64();

        let response = match sent {
            Ok(response) => response,
            Err(error) => {
                warn!(error = %error, elapsed, "request failed");
                return Record::without_locations(error.status_code(), url, elapsed);
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(source) => {
                let error = FetchError::body(url, source);
                warn!(error = %error, "response body read failed");
                return Record::without_locations(STATUS_READ, url, elapsed);
            }
        };

        if status != StatusCode::OK {
            debug!(status = status.as_u16(), "non-OK status");
            return Record::without_locations(status_line(status), url, elapsed);
        }

        let envelope = match HandleResponse::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(source) => {
                let error = FetchError::json(url, source);
                warn!(error = %error, "response is not a handle record");
                return Record::without_locations(STATUS_JSON, url, elapsed);
            }
        };

        match envelope.locations() {
            Ok(locations) => {
                debug!(
                    handle = %envelope.handle,
                    locations = locations.len(),
                    elapsed,
                    "resolved"
                );
                Record::new(status_line(status), url, elapsed, locations)
            }
            Err(source) => {
                let error = FetchError::json(url, source);
                warn!(error = %error, "URL value has unexpected data");
                Record::without_locations(STATUS_JSON, url, elapsed)
            }
        }
    }
}

/// Renders a status as `"<code> <reason>"`, e.g. `404 Not Found`.
fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}
