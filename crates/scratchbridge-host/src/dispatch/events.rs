use scratchbridge_core::error::{BridgeError, ErrorCode};
use scratchbridge_core::ProjectPayload;

/// Host callbacks as values, for hosts that consume them later
/// (an async task, or a JS callback table invoked after the bridge call).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    RuntimeLoaded,
    Ready,
    Saved(ProjectPayload),
    Thumbnail(String),
    Changed,
    Error {
        code: ErrorCode,
        message: String,
        fatal: bool,
    },
}

impl HostEvent {
    pub fn error(err: &BridgeError) -> Self {
        HostEvent::Error {
            code: err.code(),
            message: err.to_string(),
            fatal: err.is_fatal(),
        }
    }
}
