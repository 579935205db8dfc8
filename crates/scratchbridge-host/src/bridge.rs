//! Editor bridge facade.
//!
//! One `EditorBridge` per mounted peer. It owns the session state, the
//! command channel and the router, and is driven from a single event loop:
//! every method runs to completion before the next, so state transitions
//! never interleave.
//!
//! Lifecycle: `new` (mount, loading) -> `attach` (peer window exists)
//! -> peer events via `handle_message` -> `unmount`. After unmount every
//! inbound message is dropped and every command is a no-op.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use scratchbridge_core::error::BridgeError;
use scratchbridge_core::protocol::{HostCommand, PeerEnvelope, PeerEventKind};
use scratchbridge_core::ProjectPayload;

use crate::config::BridgeSection;
use crate::dispatch::{BridgeHost, EventRouter, RouteCtx};
use crate::obs::BridgeMetrics;
use crate::session::{BridgeSession, Intake, PendingRequests};
use crate::transport::{CommandChannel, PeerTarget};

static NEXT_BRIDGE_ID: AtomicU64 = AtomicU64::new(1);

/// Source of "now" for request deadlines and round-trip timing.
pub type Clock = fn() -> Instant;

pub struct EditorBridge<H, P> {
    id: u64,
    session: BridgeSession,
    requests: PendingRequests,
    channel: CommandChannel<P>,
    router: EventRouter,
    host: H,
    metrics: Arc<BridgeMetrics>,
    clock: Option<Clock>,
    mounted: bool,
}

impl<H: BridgeHost, P: PeerTarget> EditorBridge<H, P> {
    pub fn new(settings: &BridgeSection, host: H) -> Self {
        Self::with_metrics(settings, host, Arc::new(BridgeMetrics::default()))
    }

    pub fn with_metrics(settings: &BridgeSection, host: H, metrics: Arc<BridgeMetrics>) -> Self {
        let id = NEXT_BRIDGE_ID.fetch_add(1, Ordering::Relaxed);
        metrics.mounted.inc(&[]);
        tracing::info!(bridge = id, mode = ?settings.mode, "editor bridge mounted");
        Self {
            id,
            session: BridgeSession::new(),
            requests: PendingRequests::new(settings.request_timeout()),
            channel: CommandChannel::new(settings.host_source.as_str(), Arc::clone(&metrics)),
            router: EventRouter::new(settings.peer_source.as_str(), settings.mode, Arc::clone(&metrics)),
            host,
            metrics,
            clock: Some(Instant::now),
            mounted: true,
        }
    }

    /// Replace the clock (the async runtime uses tokio's).
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Run without a clock: no deadlines and no round-trip timing.
    /// Needed where `Instant` is unavailable (wasm32).
    pub fn without_clock(mut self) -> Self {
        self.clock = None;
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn metrics(&self) -> &Arc<BridgeMetrics> {
        &self.metrics
    }

    pub fn is_ready(&self) -> bool {
        self.session.is_ready()
    }

    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn session(&self) -> &BridgeSession {
        &self.session
    }

    /// Attach the peer window. Ignored after unmount.
    pub fn attach(&mut self, peer: P) {
        if !self.mounted {
            tracing::debug!(bridge = self.id, "attach after unmount ignored");
            return;
        }
        self.channel.attach(peer);
    }

    pub fn detach(&mut self) -> Option<P> {
        self.channel.detach()
    }

    /// Payload intake: load now if ready, park it otherwise, skip repeats.
    pub fn supply_payload(&mut self, payload: impl Into<ProjectPayload>) -> Intake {
        if !self.mounted {
            return Intake::Empty;
        }
        let intake = self.session.offer_payload(payload.into());
        match &intake {
            Intake::Dispatch(payload) => {
                self.channel.send(HostCommand::LoadProject, Some(payload.clone()));
            }
            Intake::Queued => tracing::debug!(bridge = self.id, "peer not ready, project queued"),
            Intake::Duplicate => tracing::trace!(bridge = self.id, "same project offered again"),
            Intake::Empty => {}
        }
        intake
    }

    /// Inbound raw message from the shared channel.
    pub fn handle_message(&mut self, text: &str) {
        if !self.mounted {
            return;
        }
        let now = self.now();
        let ctx = RouteCtx {
            session: &mut self.session,
            requests: &mut self.requests,
            channel: &self.channel,
            now,
        };
        self.router.route_text(ctx, &self.host, text);
    }

    /// Inbound envelope already decoded by the transport.
    pub fn handle_envelope(&mut self, env: PeerEnvelope) {
        if !self.mounted {
            return;
        }
        let now = self.now();
        let ctx = RouteCtx {
            session: &mut self.session,
            requests: &mut self.requests,
            channel: &self.channel,
            now,
        };
        self.router.route_envelope(ctx, &self.host, env);
    }

    /// Ask the peer for the project; answered by `on_save`.
    pub fn request_save(&mut self) -> bool {
        self.request(HostCommand::SaveProject)
    }

    pub fn run(&self) -> bool {
        self.channel.send(HostCommand::RunProject, None)
    }

    pub fn stop(&self) -> bool {
        self.channel.send(HostCommand::StopProject, None)
    }

    /// Ask the peer for a thumbnail; answered by `on_thumbnail`.
    pub fn get_thumbnail(&mut self) -> bool {
        self.request(HostCommand::GetThumbnail)
    }

    fn request(&mut self, command: HostCommand) -> bool {
        let sent = self.channel.send(command, None);
        if let (true, Some(answer), Some(now)) = (sent, command.answered_by(), self.now()) {
            self.requests.arm(answer, now);
        }
        sent
    }

    /// Report requests whose deadline passed. Returns how many expired.
    pub fn poll_timeouts(&mut self) -> usize {
        let (Some(now), Some(timeout)) = (self.now(), self.requests.timeout()) else {
            return 0;
        };
        let expired = self.requests.expire(now);
        for event in &expired {
            self.router.report(
                &self.host,
                BridgeError::RequestTimeout {
                    event: *event,
                    timeout_ms: timeout.as_millis() as u64,
                },
            );
        }
        expired.len()
    }

    pub fn is_awaiting(&self, answer: PeerEventKind) -> bool {
        self.requests.is_pending(answer)
    }

    /// Tear down: detach the peer and stop reacting to anything.
    pub fn unmount(&mut self) {
        self.teardown();
    }

    fn now(&self) -> Option<Instant> {
        self.clock.map(|clock| clock())
    }
}

impl<H, P> EditorBridge<H, P> {
    fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.channel.detach();
        self.requests.clear();
        self.metrics.mounted.dec(&[]);
        tracing::info!(bridge = self.id, "editor bridge unmounted");
    }
}

impl<H, P> Drop for EditorBridge<H, P> {
    fn drop(&mut self) {
        self.teardown();
    }
}
