//! Run counters shared by the producer, workers and sink.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Statistics from a pipeline run.
///
/// Uses atomic counters so the producer, every worker and the sink can
/// update it concurrently without locks.
#[derive(Debug, Default)]
pub struct PipelineStats {
    submitted: AtomicUsize,
    skipped: AtomicUsize,
    emitted: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Targets accepted into the pool.
    pub submitted: usize,
    /// Non-blank lines that did not form a valid target.
    pub skipped: usize,
    /// Records written by the sink.
    pub emitted: usize,
    /// Emitted records with a `200` status.
    pub succeeded: usize,
    /// Emitted records with any other status.
    pub failed: usize,
}

impl PipelineStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of targets accepted into the pool.
    #[must_use]
    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    /// Returns the number of skipped input lines.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Returns the number of records written.
    #[must_use]
    pub fn emitted(&self) -> usize {
        self.emitted.load(Ordering::SeqCst)
    }

    /// Returns a snapshot of every counter.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            submitted: self.submitted(),
            skipped: self.skipped(),
            emitted: self.emitted(),
            succeeded: self.succeeded.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
        }
    }

    pub(crate) fn increment_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    /// Counts one written record, bucketed by outcome.
    pub(crate) fn record_emitted(&self, success: bool) {
        self.emitted.fetch_add(1, Ordering::SeqCst);
        if success {
            self.succeeded.fetch_add(1, Ordering::SeqCst);
        } else {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
    }
}
