//! Retrieval engine: one handle API lookup per target, with bounded retry.
//!
//! This module turns a [`Target`](crate::target::Target) into a [`Record`]
//! and never fails while doing so; transport, read and parse errors are
//! classified into the record's status instead.
//!
//! # Features
//!
//! - Pooled reqwest client with connect/read timeouts and gzip
//! - Bounded exponential backoff on request construction and transport errors
//! - Terminal handling of every HTTP status other than `200` (never retried,
//!   redirects not followed)
//! - Projection of `URL`-typed handle values into record locations
//!
//! # Example
//!
//! ```no_run
//! use handlefetch::fetch::{HttpClient, HttpRetriever, Retrieve, RetryPolicy};
//! use handlefetch::target::Target;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let retriever = HttpRetriever::new(HttpClient::new()?, RetryPolicy::default());
//! let target = Target::from_line("10.1000/182", "http://doi.org/api/handles")?;
//! let record = retriever.retrieve(&target).await;
//! println!("{record}");
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod envelope;
mod error;
mod record;
mod retriever;
mod retry;

pub use client::HttpClient;
pub use constants::{
    CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS, SENTINEL_LOCATION, STATUS_JSON, STATUS_READ,
    STATUS_REQUEST,
};
pub use envelope::{HandleResponse, HandleValue, UrlData};
pub use error::FetchError;
pub use record::{Record, sentinel_locations};
pub use retriever::{HttpRetriever, Retrieve};
pub use retry::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_ELAPSED, FailureType, RetryDecision, RetryPolicy,
    classify_error,
};
