//! Outbound command channel.
//!
//! A bridge owns at most one peer target. Sending with no target attached,
//! or to a target that refuses the message, drops the command: callers get
//! no delivery confirmation from `send`.

use std::sync::Arc;

use scratchbridge_core::error::Result;
use scratchbridge_core::protocol::{HostCommand, HostEnvelope};
use scratchbridge_core::ProjectPayload;

use crate::obs::BridgeMetrics;

/// Something that can deliver host envelopes to the embedded peer.
pub trait PeerTarget {
    fn post(&self, env: &HostEnvelope) -> Result<()>;
}

pub struct CommandChannel<P> {
    source: String,
    target: Option<P>,
    metrics: Arc<BridgeMetrics>,
}

impl<P> CommandChannel<P> {
    pub fn new(source: impl Into<String>, metrics: Arc<BridgeMetrics>) -> Self {
        Self {
            source: source.into(),
            target: None,
            metrics,
        }
    }

    /// Attach the peer; replaces any previous target.
    pub fn attach(&mut self, target: P) {
        self.target = Some(target);
    }

    pub fn detach(&mut self) -> Option<P> {
        self.target.take()
    }

    pub fn is_attached(&self) -> bool {
        self.target.is_some()
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl<P: PeerTarget> CommandChannel<P> {
    /// Send a command. Returns whether the target accepted it.
    pub fn send(&self, command: HostCommand, data: Option<ProjectPayload>) -> bool {
        let Some(target) = self.target.as_ref() else {
            tracing::debug!(command = command.as_str(), "no peer attached, command dropped");
            self.count(command, "dropped");
            return false;
        };

        let env = HostEnvelope::new(self.source.as_str(), command, data);
        match target.post(&env) {
            Ok(()) => {
                tracing::trace!(command = command.as_str(), "command posted");
                self.count(command, "sent");
                true
            }
            Err(e) => {
                tracing::debug!(command = command.as_str(), error = %e, "peer refused command, dropped");
                self.count(command, "dropped");
                false
            }
        }
    }

    fn count(&self, command: HostCommand, outcome: &str) {
        self.metrics
            .commands
            .inc(&[("type", command.as_str()), ("outcome", outcome)]);
    }
}
