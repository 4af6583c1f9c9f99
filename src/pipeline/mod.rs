//! Concurrent resolution pipeline: producer, worker pool and sink.
//!
//! ```text
//! input ─▶ producer ─(targets, unbuffered)─▶ W workers ─(records, unbuffered)─▶ sink ─▶ output
//! ```
//!
//! # Shutdown Order
//!
//! 1. The producer reaches end-of-stream and drops the target sender
//! 2. Each worker drains what is left and exits on the closed, empty channel
//! 3. [`WorkerPool::drained`] returns once every worker has exited
//! 4. The orchestrator drops its record sender, closing the record channel
//! 5. The sink drains the remaining records and signals done
//! 6. [`Pipeline::run`] returns after the done signal
//!
//! The record channel is never closed before step 3, so no in-flight record
//! can be lost.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use handlefetch::fetch::{HttpClient, HttpRetriever, RetryPolicy};
//! use handlefetch::pipeline::{Pipeline, PipelineConfig};
//! use handlefetch::target::DEFAULT_PREFIX;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let retriever = Arc::new(HttpRetriever::new(HttpClient::new()?, RetryPolicy::default()));
//! let pipeline = Pipeline::new(PipelineConfig::new(8)?, retriever, DEFAULT_PREFIX);
//! let input = tokio::io::BufReader::new(tokio::io::stdin());
//! let summary = pipeline.run(input, tokio::io::stdout()).await?;
//! eprintln!("{} records written", summary.emitted);
//! # Ok(())
//! # }
//! ```

mod error;
mod pool;
mod producer;
mod sink;
mod stats;

pub use error::PipelineError;
pub use pool::WorkerPool;
pub use producer::produce;
pub use stats::{PipelineStats, RunSummary};

use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, info, instrument};

use crate::fetch::{Record, Retrieve};
use crate::target::Target;

/// Minimum allowed worker count.
pub const MIN_WORKERS: usize = 1;

/// Maximum allowed worker count.
pub const MAX_WORKERS: usize = 1024;

/// Returns the default worker count: the host's available parallelism.
#[must_use]
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(MIN_WORKERS, NonZeroUsize::get)
}

/// Validated pipeline settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers().clamp(MIN_WORKERS, MAX_WORKERS),
        }
    }
}

impl PipelineConfig {
    /// Creates a config with an explicit pool size.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidWorkers`] if `workers` is outside
    /// `MIN_WORKERS..=MAX_WORKERS`.
    pub fn new(workers: usize) -> Result<Self, PipelineError> {
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&workers) {
            return Err(PipelineError::InvalidWorkers { value: workers });
        }
        Ok(Self { workers })
    }

    /// Returns the configured pool size.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }
}

/// One resolution run from an input stream to an output stream.
pub struct Pipeline {
    config: PipelineConfig,
    retriever: Arc<dyn Retrieve>,
    prefix: String,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a pipeline that normalizes input lines against `prefix`.
    #[must_use]
    pub fn new(
        config: PipelineConfig,
        retriever: Arc<dyn Retrieve>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            config,
            retriever,
            prefix: prefix.into(),
        }
    }

    /// Resolves every line of `input` and writes one record line per target to `output`.
    ///
    /// Returns when every accepted target has been written, following the
    /// shutdown order in the module docs.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Input`] as soon as reading `input` fails; in-flight
    ///   targets are abandoned
    /// - [`PipelineError::Output`] after draining, if writing `output` failed
    /// - [`PipelineError::PoolClosed`] / [`PipelineError::SinkLost`] if a task died
    #[instrument(skip_all, fields(workers = self.config.workers, prefix = %self.prefix))]
    pub async fn run<R, W>(&self, input: R, output: W) -> Result<RunSummary, PipelineError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let stats = Arc::new(PipelineStats::new());
        let (target_tx, target_rx) = flume::bounded::<Target>(0);
        let (record_tx, record_rx) = flume::bounded::<Record>(0);

        let done = sink::spawn(record_rx, output, Arc::clone(&stats));
        let pool = WorkerPool::spawn(self.config.workers, &self.retriever, &target_rx, &record_tx);
        drop(target_rx);

        info!(workers = pool.len(), "pipeline started");

        produce(input, &self.prefix, target_tx, &stats).await?;

        pool.drained().await;
        drop(record_tx);
        debug!("record channel closed");

        done.await
            .map_err(|_| PipelineError::SinkLost)?
            .map_err(PipelineError::Output)?;

        let summary = stats.summary();
        info!(
            submitted = summary.submitted,
            skipped = summary.skipped,
            emitted = summary.emitted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "pipeline finished"
        );
        Ok(summary)
    }
}
