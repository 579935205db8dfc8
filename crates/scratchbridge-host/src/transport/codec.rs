//! Decode-once codec for inbound peer messages.
//!
//! Raw text => `PeerEnvelope` (lazy `RawValue` for data), then classified
//! by origin and event type. Nothing here has side effects; the router
//! decides what to do with each `Inbound`.

use scratchbridge_core::protocol::{PeerEnvelope, PeerEventKind};

#[derive(Debug)]
pub enum Inbound {
    /// A known event from the designated peer.
    Event { kind: PeerEventKind, env: PeerEnvelope },
    /// From the designated peer, but an event type we do not know.
    Unknown(PeerEnvelope),
    /// Another origin, or not an envelope at all.
    Foreign,
}

pub fn decode(text: &str, peer_source: &str) -> Inbound {
    match PeerEnvelope::from_json(text) {
        Ok(env) => classify(env, peer_source),
        Err(e) => {
            tracing::trace!(error = %e, "ignoring non-envelope message");
            Inbound::Foreign
        }
    }
}

pub fn classify(env: PeerEnvelope, peer_source: &str) -> Inbound {
    if !env.is_from(peer_source) {
        return Inbound::Foreign;
    }
    match env.kind() {
        Some(kind) => Inbound::Event { kind, env },
        None => Inbound::Unknown(env),
    }
}
