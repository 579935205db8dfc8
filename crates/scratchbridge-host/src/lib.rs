//! scratchbridge host library entry.
//!
//! This crate wires the command channel, the inbound codec, the session
//! state machine and the event router into an `EditorBridge`. With the
//! default `runtime` feature it also provides the tokio runtime, the stdio
//! transport and the project persistence boundary. It is consumed by the
//! harness binary (`main.rs`), by the browser adapter, and by integration
//! tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod obs;
pub mod registry;
pub mod session;
pub mod transport;

#[cfg(feature = "runtime")]
pub mod projects;
#[cfg(feature = "runtime")]
pub mod runtime;

pub use bridge::EditorBridge;
pub use dispatch::{BridgeHost, HostEvent};
#[cfg(feature = "runtime")]
pub use runtime::{BridgeHandle, BridgeRuntime, ChannelHost};
