//! Host and peer envelopes (JSON).
//!
//! Peer envelopes keep `data` as `RawValue`; only events that carry an
//! outcome parse it.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{BridgeError, Result};
use crate::payload::ProjectPayload;
use crate::protocol::kinds::{HostCommand, PeerEventKind};

/// Host -> peer envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostEnvelope {
    /// Host source tag.
    pub source: String,
    /// Command (field name is `type` in JSON).
    #[serde(rename = "type")]
    pub command: HostCommand,
    /// Project payload, only for `LOAD_PROJECT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ProjectPayload>,
}

impl HostEnvelope {
    pub fn new(source: impl Into<String>, command: HostCommand, data: Option<ProjectPayload>) -> Self {
        Self {
            source: source.into(),
            command,
            data,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| BridgeError::Internal(format!("envelope encode failed: {e}")))
    }
}

/// Peer -> host envelope.
///
/// Unknown fields are tolerated so newer peers stay compatible.
#[derive(Debug, Deserialize, Serialize)]
pub struct PeerEnvelope {
    /// Origin tag; must equal the configured peer source.
    pub source: String,
    /// Event type (field name is `type` in JSON).
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Optional outcome, stored as raw JSON (lazy parsing).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Box<RawValue>>,
}

impl PeerEnvelope {
    /// Build a peer envelope; used by tests and the stdio harness.
    pub fn event(
        source: impl Into<String>,
        kind: PeerEventKind,
        outcome: Option<&EventOutcome>,
    ) -> Result<Self> {
        let data = outcome
            .map(serde_json::value::to_raw_value)
            .transpose()
            .map_err(|e| BridgeError::Internal(format!("outcome encode failed: {e}")))?;
        Ok(Self {
            source: source.into(),
            msg_type: kind.as_str().to_string(),
            data,
        })
    }

    /// Decode a peer envelope from JSON text.
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s)
            .map_err(|e| BridgeError::BadEnvelope(format!("invalid envelope json: {e}")))
    }

    pub fn kind(&self) -> Option<PeerEventKind> {
        PeerEventKind::from_wire(&self.msg_type)
    }

    pub fn is_from(&self, source: &str) -> bool {
        self.source == source
    }

    /// Parse `data` as an outcome.
    ///
    /// Missing or malformed data yields a failed outcome describing the
    /// problem, so callers only ever branch on `success`.
    pub fn outcome(&self) -> EventOutcome {
        let Some(raw) = self.data.as_ref() else {
            return EventOutcome::failure("event carried no outcome");
        };
        match serde_json::from_str::<EventOutcome>(raw.get()) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!(msg_type = %self.msg_type, error = %e, "malformed event outcome");
                EventOutcome::failure(format!("malformed outcome: {e}"))
            }
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| BridgeError::Internal(format!("envelope encode failed: {e}")))
    }
}

/// `{ success, data?, error? }` carried by load/save/thumbnail events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EventOutcome {
    pub fn success(data: Option<String>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Error text for logging; peers do not always fill `error`.
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or("unknown error")
    }

    /// Convert into the returned data, or a `PeerFailure` for `event`.
    pub fn into_data(self, event: PeerEventKind) -> Result<String> {
        if !self.success {
            let message = self.error_message().to_string();
            return Err(BridgeError::PeerFailure { event, message });
        }
        self.data.ok_or_else(|| BridgeError::PeerFailure {
            event,
            message: "success reported without data".into(),
        })
    }
}
