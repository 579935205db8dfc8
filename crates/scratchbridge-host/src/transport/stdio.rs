//! Line-delimited stdio transport.
//!
//! Each line is one JSON envelope. Outbound lines come from a `QueuedPeer`
//! receiver; inbound lines are handed to a running bridge in arrival order.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::runtime::BridgeHandle;

/// Write queued host envelopes until the queue closes.
pub async fn pump_outbound<W>(mut rx: mpsc::Receiver<String>, mut out: W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        out.write_all(line.as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.flush().await?;
    }
    Ok(())
}

/// Feed peer lines to the bridge until input ends or the bridge is gone.
/// Returns the number of lines delivered.
pub async fn pump_inbound<R>(input: R, handle: BridgeHandle) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut delivered = 0usize;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if handle.deliver(line).await.is_err() {
            tracing::debug!(bridge = handle.id(), "bridge gone, inbound pump stopping");
            break;
        }
        delivered += 1;
    }
    Ok(delivered)
}
