use tokio::sync::mpsc;

use scratchbridge_core::error::{BridgeError, Result};
use scratchbridge_core::protocol::HostEnvelope;

use super::PeerTarget;

/// Peer target backed by a bounded queue of encoded JSON lines.
///
/// `try_send` only: a full or closed queue drops the command.
#[derive(Clone)]
pub struct QueuedPeer {
    tx: mpsc::Sender<String>,
}

impl QueuedPeer {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl PeerTarget for QueuedPeer {
    fn post(&self, env: &HostEnvelope) -> Result<()> {
        let line = env.to_json()?;
        self.tx.try_send(line).map_err(|e| match e {
            mpsc::error::TrySendError::Closed(_) => BridgeError::PeerDetached,
            mpsc::error::TrySendError::Full(_) => {
                BridgeError::Internal("peer queue full".into())
            }
        })
    }
}
