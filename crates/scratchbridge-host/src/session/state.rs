//! Per-mount bridge session state.
//!
//! Two independent readiness axes are tracked because the peer reports
//! them separately: `loading` clears when the runtime shell has loaded,
//! `ready` sets when the engine accepts commands. Neither ever reverts.
//!
//! Payload intake and the ready flush are pure transitions that return the
//! action to perform; the caller does the I/O. Each transition runs to
//! completion on `&mut self`, so a flush can never interleave with an
//! intake and double-send.

use scratchbridge_core::ProjectPayload;

/// What the caller must do with a supplied payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intake {
    /// Empty payload, nothing to load.
    Empty,
    /// Same payload as the last one loaded.
    Duplicate,
    /// Peer is ready: send `LOAD_PROJECT` with this payload now.
    Dispatch(ProjectPayload),
    /// Peer not ready yet: payload parked until the ready flush.
    Queued,
}

#[derive(Debug)]
pub struct BridgeSession {
    ready: bool,
    loading: bool,
    pending_payload: Option<ProjectPayload>,
    last_loaded_payload: Option<ProjectPayload>,
}

impl Default for BridgeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeSession {
    pub fn new() -> Self {
        Self {
            ready: false,
            loading: true,
            pending_payload: None,
            last_loaded_payload: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn pending_payload(&self) -> Option<&ProjectPayload> {
        self.pending_payload.as_ref()
    }

    pub fn last_loaded_payload(&self) -> Option<&ProjectPayload> {
        self.last_loaded_payload.as_ref()
    }

    pub fn offer_payload(&mut self, payload: ProjectPayload) -> Intake {
        if payload.is_empty() {
            return Intake::Empty;
        }
        if self.last_loaded_payload.as_ref() == Some(&payload) {
            return Intake::Duplicate;
        }
        if self.ready {
            self.last_loaded_payload = Some(payload.clone());
            Intake::Dispatch(payload)
        } else {
            // Only the newest payload matters; an older one is stale.
            self.pending_payload = Some(payload);
            Intake::Queued
        }
    }

    /// Runtime shell loaded. Returns true on the first call only.
    pub fn mark_runtime_loaded(&mut self) -> bool {
        std::mem::replace(&mut self.loading, false)
    }

    /// Engine ready. Returns the parked payload to flush, if any, already
    /// recorded as the last loaded one.
    ///
    /// A repeated ready event flushes nothing: the pending slot is only
    /// ever filled while not ready.
    pub fn mark_ready(&mut self) -> Option<ProjectPayload> {
        self.ready = true;
        let payload = self.pending_payload.take()?;
        self.last_loaded_payload = Some(payload.clone());
        Some(payload)
    }
}
