//! Error types for pipeline orchestration.

use thiserror::Error;

use super::{MAX_WORKERS, MIN_WORKERS};

/// Errors that abort a pipeline run.
///
/// Per-target failures never appear here; they are carried by each record.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid worker count provided.
    #[error("invalid worker count {value}: must be between {MIN_WORKERS} and {MAX_WORKERS}")]
    InvalidWorkers {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Reading the input stream failed for a reason other than end-of-stream.
    #[error("failed to read input: {0}")]
    Input(#[source] std::io::Error),

    /// Writing records to the output stream failed.
    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),

    /// Every worker exited while targets were still being produced.
    #[error("worker pool closed before input was exhausted")]
    PoolClosed,

    /// The sink task ended without reporting completion.
    #[error("sink task ended without signalling completion")]
    SinkLost,
}
