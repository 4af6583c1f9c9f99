//! Handlefetch Core Library
//!
//! This library resolves a stream of handle identifiers (DOIs and other
//! handles) against the handle HTTP API and reports the URL locations
//! registered for each one, one tab-separated record per identifier.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`target`] - Normalization of input lines into request addresses
//! - [`fetch`] - Retrieval engine: HTTP client, bounded retry, response classification
//! - [`pipeline`] - Producer, bounded worker pool and sink with ordered shutdown

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod fetch;
pub mod pipeline;
pub mod target;

mod user_agent;

// Re-export commonly used types
pub use fetch::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_ELAPSED, FetchError, HttpClient, HttpRetriever, Record,
    Retrieve, RetryPolicy,
};
pub use pipeline::{
    MAX_WORKERS, Pipeline, PipelineConfig, PipelineError, RunSummary, default_workers,
};
pub use target::{DEFAULT_PREFIX, Target, TargetError};
