//! Worker pool: a fixed set of tasks pulling targets and publishing records.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::fetch::{Record, Retrieve};
use crate::target::Target;

/// A fixed-size set of workers sharing one target channel and one record channel.
///
/// # Concurrency Model
///
/// - Each worker is its own Tokio task holding one target at a time
/// - Workers share nothing but clones of the two channel endpoints
/// - A worker exits when the target channel is closed and empty
/// - [`WorkerPool::drained`] is the completion barrier: it resolves only after
///   every worker has exited, so every accepted target has produced a record
#[derive(Debug)]
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `workers` tasks.
    ///
    /// Each worker gets its own clone of `targets` and `records`; the caller's
    /// endpoints stay with the caller, which must drop its `records` sender
    /// after [`drained`](Self::drained) for the sink to see the channel close.
    #[instrument(level = "debug", skip(retriever, targets, records))]
    pub fn spawn(
        workers: usize,
        retriever: &Arc<dyn Retrieve>,
        targets: &flume::Receiver<Target>,
        records: &flume::Sender<Record>,
    ) -> Self {
        let handles = (0..workers)
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    Arc::clone(retriever),
                    targets.clone(),
                    records.clone(),
                ))
            })
            .collect();
        Self { handles }
    }

    /// Returns the number of workers spawned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns true if the pool has no workers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Waits until every worker has exited.
    pub async fn drained(self) {
        debug!(workers = self.handles.len(), "waiting for workers to drain");
        for handle in self.handles {
            // A panicking worker loses at most its in-flight target; the rest keep going.
            if let Err(e) = handle.await {
                warn!(error = %e, "worker task panicked");
            }
        }
        debug!("all workers exited");
    }
}

/// One worker: receive, retrieve, publish, until the target channel closes.
async fn run_worker(
    id: usize,
    retriever: Arc<dyn Retrieve>,
    targets: flume::Receiver<Target>,
    records: flume::Sender<Record>,
) {
    let mut processed = 0usize;
    while let Ok(target) = targets.recv_async().await {
        let record = retriever.retrieve(&target).await;
        if records.send_async(record).await.is_err() {
            warn!(worker = id, url = %target, "record channel closed; dropping result");
            break;
        }
        processed += 1;
    }
    debug!(worker = id, processed, "worker exiting");
}
