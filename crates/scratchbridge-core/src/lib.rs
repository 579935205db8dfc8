//! scratchbridge core: wire contracts shared by the host page and the
//! embedded editor peer.
//!
//! This crate defines the message envelopes, the command/event vocabulary,
//! the opaque project payload, and the error surface. It carries no
//! transport or runtime dependencies so both the native host and the
//! browser adapter can reuse it.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed peer traffic surfaces as `BridgeError`/`Result` or as a failed
//! outcome, never as a crash.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod payload;
pub mod protocol;

pub use error::{BridgeError, ErrorCode, Result};
pub use payload::ProjectPayload;
