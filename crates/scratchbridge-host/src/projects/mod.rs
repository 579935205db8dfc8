//! Project persistence boundary.
//!
//! The bridge itself never persists anything; `on_save` payloads flow
//! through a `SaveCoordinator` into a `ProjectStore`.

pub mod coordinator;
pub mod store;
pub mod types;

pub use coordinator::{SaveCoordinator, SaveOutcome};
pub use store::{ProjectStore, RestProjectStore};
pub use types::{NewProject, Project, ProjectJson, ProjectUpdate};
