#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use scratchbridge_core::error::{BridgeError, ErrorCode, Result};
use scratchbridge_core::protocol::{EventOutcome, HostCommand, HostEnvelope, PeerEnvelope, PeerEventKind};
use scratchbridge_core::ProjectPayload;
use scratchbridge_host::config::BridgeSection;
use scratchbridge_host::dispatch::BridgeHost;
use scratchbridge_host::transport::PeerTarget;
use scratchbridge_host::EditorBridge;

pub const PEER: &str = "embedded-editor";

/// Peer that records every posted envelope.
#[derive(Clone, Default)]
pub struct RecordingPeer {
    pub sent: Rc<RefCell<Vec<HostEnvelope>>>,
}

impl RecordingPeer {
    pub fn commands(&self) -> Vec<HostCommand> {
        self.sent.borrow().iter().map(|e| e.command).collect()
    }

    pub fn loads(&self) -> Vec<String> {
        self.sent
            .borrow()
            .iter()
            .filter(|e| e.command == HostCommand::LoadProject)
            .map(|e| e.data.as_ref().map(|d| d.as_str().to_string()).unwrap_or_default())
            .collect()
    }
}

impl PeerTarget for RecordingPeer {
    fn post(&self, env: &HostEnvelope) -> Result<()> {
        self.sent.borrow_mut().push(env.clone());
        Ok(())
    }
}

/// Peer whose window is gone.
pub struct ClosedPeer;

impl PeerTarget for ClosedPeer {
    fn post(&self, _env: &HostEnvelope) -> Result<()> {
        Err(BridgeError::PeerDetached)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RuntimeLoaded,
    Ready,
    Save(String),
    Thumbnail(String),
    Changed,
    Error(ErrorCode),
}

/// Host that records every callback.
#[derive(Clone, Default)]
pub struct CountingHost {
    pub calls: Rc<RefCell<Vec<Call>>>,
}

impl CountingHost {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn errors(&self) -> Vec<ErrorCode> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Error(code) => Some(*code),
                _ => None,
            })
            .collect()
    }
}

impl BridgeHost for CountingHost {
    fn on_runtime_loaded(&self) {
        self.calls.borrow_mut().push(Call::RuntimeLoaded);
    }
    fn on_ready(&self) {
        self.calls.borrow_mut().push(Call::Ready);
    }
    fn on_save(&self, payload: ProjectPayload) {
        self.calls.borrow_mut().push(Call::Save(payload.as_str().to_string()));
    }
    fn on_thumbnail(&self, image: String) {
        self.calls.borrow_mut().push(Call::Thumbnail(image));
    }
    fn on_project_change(&self) {
        self.calls.borrow_mut().push(Call::Changed);
    }
    fn on_error(&self, err: &BridgeError) {
        self.calls.borrow_mut().push(Call::Error(err.code()));
    }
}

pub fn mounted(settings: &BridgeSection) -> (EditorBridge<CountingHost, RecordingPeer>, CountingHost, RecordingPeer) {
    let host = CountingHost::default();
    let peer = RecordingPeer::default();
    let mut bridge = EditorBridge::new(settings, host.clone());
    bridge.attach(peer.clone());
    (bridge, host, peer)
}

/// Encoded peer event from `source`.
pub fn event_from(source: &str, kind: PeerEventKind, outcome: Option<EventOutcome>) -> String {
    PeerEnvelope::event(source, kind, outcome.as_ref())
        .unwrap()
        .to_json()
        .unwrap()
}

pub fn event(kind: PeerEventKind, outcome: Option<EventOutcome>) -> String {
    event_from(PEER, kind, outcome)
}
