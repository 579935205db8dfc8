//! Inbound event routing.
//!
//! Re-exports the router and the host callback trait so downstream
//! consumers can depend on this module directly.

pub mod events;
pub mod router;

pub use events::HostEvent;
pub use router::{BridgeHost, EventRouter, RouteCtx};
