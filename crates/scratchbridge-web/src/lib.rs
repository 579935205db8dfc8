//! Browser adapter for scratchbridge.
//!
//! Exposes `WebBridge` to JavaScript through wasm-bindgen: the host page
//! mounts it on the editor iframe, supplies project data, and gets saves,
//! thumbnails and change notifications back through callbacks. Peer
//! messages arrive through the window `message` event; commands leave via
//! `postMessage` on the iframe's content window. The editor toolbar's
//! `scratch-save-request` window event triggers a save as well.
//!
//! There are no request deadlines here: the browser build runs without a
//! clock.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bridge;
mod host;
mod options;
mod peer;
mod relay;
mod teardown;

pub use bridge::WebBridge;
pub use options::{MountSettings, DEFAULT_GLOBAL_NAME, DEFAULT_SAVE_EVENT};
