use std::sync::Arc;
use std::time::Instant;

use scratchbridge_core::error::BridgeError;
use scratchbridge_core::protocol::{HostCommand, PeerEnvelope, PeerEventKind};
use scratchbridge_core::ProjectPayload;

use crate::config::BridgeMode;
use crate::obs::BridgeMetrics;
use crate::session::{BridgeSession, PendingRequests};
use crate::transport::codec::{self, Inbound};
use crate::transport::{CommandChannel, PeerTarget};

/// Callback surface the surrounding application implements.
///
/// Every method defaults to a no-op so hosts only implement what they use.
pub trait BridgeHost {
    /// Runtime shell finished loading (stop showing a spinner).
    fn on_runtime_loaded(&self) {}

    /// Engine accepts commands.
    fn on_ready(&self) {}

    /// The peer produced a saved project; persist it unmodified.
    fn on_save(&self, _payload: ProjectPayload) {}

    /// The peer produced a thumbnail image.
    fn on_thumbnail(&self, _image: String) {}

    /// The project changed in the editor (dirty flag, no payload).
    fn on_project_change(&self) {}

    /// A failure reported once; `err.is_fatal()` marks an unusable session.
    fn on_error(&self, _err: &BridgeError) {}
}

/// Mutable bridge parts an event may touch.
pub struct RouteCtx<'a, P> {
    pub session: &'a mut BridgeSession,
    pub requests: &'a mut PendingRequests,
    pub channel: &'a CommandChannel<P>,
    pub now: Option<Instant>,
}

/// Dispatches peer events to session transitions and host callbacks.
pub struct EventRouter {
    peer_source: String,
    mode: BridgeMode,
    metrics: Arc<BridgeMetrics>,
}

impl EventRouter {
    pub fn new(peer_source: impl Into<String>, mode: BridgeMode, metrics: Arc<BridgeMetrics>) -> Self {
        Self {
            peer_source: peer_source.into(),
            mode,
            metrics,
        }
    }

    pub fn peer_source(&self) -> &str {
        &self.peer_source
    }

    pub fn route_text<P: PeerTarget, H: BridgeHost + ?Sized>(
        &self,
        ctx: RouteCtx<'_, P>,
        host: &H,
        text: &str,
    ) {
        self.route(ctx, host, codec::decode(text, &self.peer_source));
    }

    pub fn route_envelope<P: PeerTarget, H: BridgeHost + ?Sized>(
        &self,
        ctx: RouteCtx<'_, P>,
        host: &H,
        env: PeerEnvelope,
    ) {
        self.route(ctx, host, codec::classify(env, &self.peer_source));
    }

    pub fn route<P: PeerTarget, H: BridgeHost + ?Sized>(
        &self,
        ctx: RouteCtx<'_, P>,
        host: &H,
        inbound: Inbound,
    ) {
        match inbound {
            Inbound::Foreign => {
                self.metrics.ignored.inc(&[("reason", "foreign")]);
            }
            Inbound::Unknown(env) => {
                tracing::debug!(msg_type = %env.msg_type, "ignoring unknown peer event");
                self.metrics.ignored.inc(&[("reason", "unknown_type")]);
            }
            Inbound::Event { kind, env } => {
                self.metrics.events.inc(&[("type", kind.as_str())]);
                self.dispatch(ctx, host, kind, env);
            }
        }
    }

    fn dispatch<P: PeerTarget, H: BridgeHost + ?Sized>(
        &self,
        ctx: RouteCtx<'_, P>,
        host: &H,
        kind: PeerEventKind,
        env: PeerEnvelope,
    ) {
        match kind {
            PeerEventKind::EditorLoaded => {
                if ctx.session.mark_runtime_loaded() {
                    tracing::info!("embedded editor runtime loaded");
                    host.on_runtime_loaded();
                }
            }
            PeerEventKind::EditorReady => {
                let first = !ctx.session.is_ready();
                // Flag and flush in one step: no intake can land in between.
                if let Some(payload) = ctx.session.mark_ready() {
                    tracing::info!(len = payload.len(), "flushing queued project to peer");
                    ctx.channel.send(HostCommand::LoadProject, Some(payload));
                }
                if first {
                    tracing::info!("embedded editor ready");
                    host.on_ready();
                }
            }
            PeerEventKind::ProjectLoaded => {
                let outcome = env.outcome();
                if outcome.success {
                    tracing::debug!("peer loaded project");
                    if self.mode == BridgeMode::Player {
                        ctx.channel.send(HostCommand::RunProject, None);
                    }
                } else {
                    let message = outcome.error_message().to_string();
                    self.report(host, BridgeError::PeerFailure { event: kind, message });
                }
            }
            PeerEventKind::ProjectSaved => {
                self.settle(ctx.requests, kind, ctx.now);
                match env.outcome().into_data(kind) {
                    Ok(data) => host.on_save(ProjectPayload::from(data)),
                    Err(e) => self.report(host, e),
                }
            }
            PeerEventKind::Thumbnail => {
                self.settle(ctx.requests, kind, ctx.now);
                match env.outcome().into_data(kind) {
                    Ok(image) => host.on_thumbnail(image),
                    Err(e) => self.report(host, e),
                }
            }
            PeerEventKind::ProjectChanged => host.on_project_change(),
            PeerEventKind::BrowserNotSupported => {
                self.report(host, BridgeError::UnsupportedEnvironment);
            }
        }
    }

    fn settle(&self, requests: &mut PendingRequests, kind: PeerEventKind, now: Option<Instant>) {
        let Some(now) = now else { return };
        if let Some(elapsed) = requests.settle(kind, now) {
            self.metrics.roundtrip.observe(&[("event", kind.as_str())], elapsed);
        }
    }

    /// Log and hand a failure to the host exactly once.
    pub fn report<H: BridgeHost + ?Sized>(&self, host: &H, err: BridgeError) {
        match &err {
            BridgeError::PeerFailure { event, .. } => {
                self.metrics.peer_failures.inc(&[("event", event.as_str())]);
            }
            BridgeError::RequestTimeout { event, .. } => {
                self.metrics.request_timeouts.inc(&[("event", event.as_str())]);
            }
            _ => {}
        }
        tracing::error!(code = err.code().as_str(), error = %err, "embedded editor error");
        host.on_error(&err);
    }
}
