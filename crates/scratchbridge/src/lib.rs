//! Top-level facade crate for scratchbridge.
//!
//! Re-exports the wire contracts and the host library so users can depend
//! on a single crate. The browser adapter (`scratchbridge-web`) is built
//! separately for wasm32.

pub mod core {
    pub use scratchbridge_core::*;
}

pub mod host {
    pub use scratchbridge_host::*;
}
