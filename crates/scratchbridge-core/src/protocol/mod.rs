//! Bridge message protocol.
//!
//! Host and peer exchange `{ source, type, data? }` envelopes over a
//! broadcast-style channel:
//! - Host -> peer: [`HostEnvelope`] carrying a [`HostCommand`] and an
//!   optional project payload.
//! - Peer -> host: [`PeerEnvelope`] carrying an event type and an optional
//!   [`EventOutcome`], parsed lazily from raw JSON.
//!
//! The `source` tag is the only origin check the channel offers; anything
//! tagged otherwise is noise and must be ignored by the receiver.

pub mod envelope;
pub mod kinds;

pub use envelope::{EventOutcome, HostEnvelope, PeerEnvelope};
pub use kinds::{HostCommand, PeerEventKind};

/// Default source tag stamped on host-originated envelopes.
pub const DEFAULT_HOST_SOURCE: &str = "host-parent";

/// Default source tag expected on peer-originated envelopes.
pub const DEFAULT_PEER_SOURCE: &str = "embedded-editor";
