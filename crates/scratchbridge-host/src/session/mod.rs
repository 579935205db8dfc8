//! Bridge session state: readiness axes, payload intake, in-flight requests.

mod requests;
mod state;

pub use requests::PendingRequests;
pub use state::{BridgeSession, Intake};
