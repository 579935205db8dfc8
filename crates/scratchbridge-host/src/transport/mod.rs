//! Transport layer.
//!
//! Exposes the outbound command channel with its peer targets, the inbound
//! codec that decodes peer messages once before they reach the router, and
//! the stdio pumps used by the harness binary.

pub mod codec;
pub mod peer;
#[cfg(feature = "runtime")]
pub mod queued;
#[cfg(feature = "runtime")]
pub mod stdio;

pub use peer::{CommandChannel, PeerTarget};
#[cfg(feature = "runtime")]
pub use queued::QueuedPeer;
