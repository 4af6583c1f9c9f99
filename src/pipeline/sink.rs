//! Sink: the single writer of result lines.

use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::PipelineStats;
use crate::fetch::Record;

/// Completion signal from the sink: the write outcome once the record
/// channel has closed and every received record has been handled.
pub type SinkDone = oneshot::Receiver<std::io::Result<()>>;

/// Spawns the sink task.
///
/// Records are written one line each, in the order they arrive. Each line is
/// flushed immediately so downstream readers see results as they complete.
/// After a write error the sink stops writing but keeps draining, so no
/// worker is left blocked on the record channel; the error is reported
/// through the done signal.
pub fn spawn<W>(
    records: flume::Receiver<Record>,
    writer: W,
    stats: Arc<PipelineStats>,
) -> SinkDone
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (done_tx, done_rx) = oneshot::channel();

    tokio::spawn(async move {
        let mut writer = BufWriter::new(writer);
        let mut failure: Option<std::io::Error> = None;

        while let Ok(record) = records.recv_async().await {
            if failure.is_some() {
                continue;
            }
            match write_record(&mut writer, &record).await {
                Ok(()) => stats.record_emitted(record.is_success()),
                Err(e) => {
                    warn!(error = %e, "output write failed; discarding remaining records");
                    failure = Some(e);
                }
            }
        }

        let outcome = match failure {
            Some(e) => Err(e),
            None => writer.flush().await,
        };
        debug!(emitted = stats.emitted(), "sink finished");

        // The orchestrator may have given up already; nothing to report to then.
        let _ = done_tx.send(outcome);
    });

    done_rx
}

async fn write_record<W>(writer: &mut W, record: &Record) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let line = format!("{record}\n");
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await
}
