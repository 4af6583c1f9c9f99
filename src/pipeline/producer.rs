//! Producer: reads input lines and feeds targets into the pool.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, instrument, trace};

use super::{PipelineError, PipelineStats};
use crate::target::{Target, TargetError};

/// Reads `reader` to end-of-stream, sending one target per valid line.
///
/// `targets` has no buffer, so each send waits until a worker takes the
/// target. Taking the sender by value means returning (for any reason) closes
/// the channel, which is the pool's only shutdown signal. A final line
/// without a trailing newline is still processed.
///
/// # Errors
///
/// Returns [`PipelineError::Input`] on a read failure and
/// [`PipelineError::PoolClosed`] if every worker has gone away.
#[instrument(skip_all, fields(prefix = %prefix))]
pub async fn produce<R>(
    mut reader: R,
    prefix: &str,
    targets: flume::Sender<Target>,
    stats: &PipelineStats,
) -> Result<(), PipelineError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buffer = Vec::new();

    loop {
        buffer.clear();
        let read = reader
            .read_until(b'\n', &mut buffer)
            .await
            .map_err(PipelineError::Input)?;
        if read == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buffer);
        let target = match Target::from_line(&line, prefix) {
            Ok(target) => target,
            Err(TargetError::Blank) => continue,
            Err(error) => {
                debug!(error = %error, "skipping malformed target");
                stats.increment_skipped();
                continue;
            }
        };

        trace!(url = %target, "queueing target");
        targets
            .send_async(target)
            .await
            .map_err(|_| PipelineError::PoolClosed)?;
        stats.increment_submitted();
    }

    debug!(submitted = stats.submitted(), "input exhausted");
    Ok(())
}
