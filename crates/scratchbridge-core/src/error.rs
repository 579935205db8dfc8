//! Shared error type across scratchbridge crates.

use thiserror::Error;

use crate::protocol::PeerEventKind;

/// Stable error codes reported to the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Inbound message is not a valid envelope.
    BadEnvelope,
    /// No peer window is attached.
    PeerDetached,
    /// The peer reported `success: false`.
    PeerFailure,
    /// The peer cannot run in this environment.
    UnsupportedEnvironment,
    /// A save/thumbnail request got no answer in time.
    RequestTimeout,
    /// Invalid configuration.
    BadConfig,
    /// Persistence rejected the credentials.
    Unauthorized,
    /// Persistence failed.
    Store,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and JS callbacks.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BadEnvelope => "BAD_ENVELOPE",
            ErrorCode::PeerDetached => "PEER_DETACHED",
            ErrorCode::PeerFailure => "PEER_FAILURE",
            ErrorCode::UnsupportedEnvironment => "UNSUPPORTED_ENVIRONMENT",
            ErrorCode::RequestTimeout => "REQUEST_TIMEOUT",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Store => "STORE",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Unified error type used by core, host and web adapter.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("bad envelope: {0}")]
    BadEnvelope(String),
    #[error("peer not attached")]
    PeerDetached,
    #[error("peer failed {event:?}: {message}")]
    PeerFailure {
        event: PeerEventKind,
        message: String,
    },
    #[error("embedded editor is not supported in this environment")]
    UnsupportedEnvironment,
    #[error("no {event:?} answer within {timeout_ms}ms")]
    RequestTimeout {
        event: PeerEventKind,
        timeout_ms: u64,
    },
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("store: {0}")]
    Store(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Map an error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            BridgeError::BadEnvelope(_) => ErrorCode::BadEnvelope,
            BridgeError::PeerDetached => ErrorCode::PeerDetached,
            BridgeError::PeerFailure { .. } => ErrorCode::PeerFailure,
            BridgeError::UnsupportedEnvironment => ErrorCode::UnsupportedEnvironment,
            BridgeError::RequestTimeout { .. } => ErrorCode::RequestTimeout,
            BridgeError::BadConfig(_) => ErrorCode::BadConfig,
            BridgeError::Unauthorized => ErrorCode::Unauthorized,
            BridgeError::Store(_) => ErrorCode::Store,
            BridgeError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Whether the bridge session is unusable after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BridgeError::UnsupportedEnvironment)
    }
}
