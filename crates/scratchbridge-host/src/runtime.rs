//! Async bridge runtime.
//!
//! Runs one `EditorBridge` inside a tokio task. Peer messages and host
//! commands arrive on a single queue and are handled one at a time, so the
//! task is the only writer of bridge state. A sweep interval reports expired
//! save/thumbnail requests when deadlines are enabled.
//!
//! The task ends on `unmount` or once every handle is dropped. Unmount
//! travels on its own watch channel, so a full command queue cannot hold it
//! back. Whatever is still queued at that point, late peer events included,
//! is discarded.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use scratchbridge_core::error::{BridgeError, Result};
use scratchbridge_core::ProjectPayload;

use crate::bridge::EditorBridge;
use crate::config::BridgeSection;
use crate::dispatch::{BridgeHost, HostEvent};
use crate::obs::BridgeMetrics;
use crate::registry::CommandHandle;
use crate::transport::PeerTarget;

/// Messages into the runtime task.
#[derive(Debug)]
pub enum BridgeCommand {
    Load(ProjectPayload),
    Save,
    Run,
    Stop,
    Thumbnail,
    /// Raw message from the peer channel.
    Deliver(String),
}

/// Cloneable handle to a running bridge.
#[derive(Clone, Debug)]
pub struct BridgeHandle {
    bridge_id: u64,
    tx: mpsc::Sender<BridgeCommand>,
    shutdown: watch::Sender<bool>,
}

impl BridgeHandle {
    pub fn id(&self) -> u64 {
        self.bridge_id
    }

    fn push(&self, cmd: BridgeCommand) -> bool {
        match self.tx.try_send(cmd) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(bridge = self.bridge_id, error = %e, "bridge command dropped");
                false
            }
        }
    }

    pub fn load(&self, payload: impl Into<ProjectPayload>) -> bool {
        self.push(BridgeCommand::Load(payload.into()))
    }

    pub fn request_save(&self) -> bool {
        self.push(BridgeCommand::Save)
    }

    pub fn run(&self) -> bool {
        self.push(BridgeCommand::Run)
    }

    pub fn stop(&self) -> bool {
        self.push(BridgeCommand::Stop)
    }

    pub fn get_thumbnail(&self) -> bool {
        self.push(BridgeCommand::Thumbnail)
    }

    /// Deliver a peer message, waiting for queue space.
    /// Peer events are never dropped while the bridge is mounted.
    pub async fn deliver(&self, text: impl Into<String>) -> Result<()> {
        self.tx
            .send(BridgeCommand::Deliver(text.into()))
            .await
            .map_err(|_| BridgeError::PeerDetached)
    }

    /// Tear the bridge down. Never blocked by queued commands; returns
    /// false if the task had already stopped.
    pub fn unmount(&self) -> bool {
        let running = !self.tx.is_closed();
        self.shutdown.send_replace(true);
        running
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl CommandHandle for BridgeHandle {
    fn bridge_id(&self) -> u64 {
        self.bridge_id
    }
    fn request_save(&self) -> bool {
        BridgeHandle::request_save(self)
    }
    fn run(&self) -> bool {
        BridgeHandle::run(self)
    }
    fn stop(&self) -> bool {
        BridgeHandle::stop(self)
    }
    fn get_thumbnail(&self) -> bool {
        BridgeHandle::get_thumbnail(self)
    }
}

pub struct BridgeRuntime;

impl BridgeRuntime {
    /// Mount a bridge with `peer` attached and run it on the current tokio runtime.
    pub fn spawn<H, P>(
        settings: &BridgeSection,
        host: H,
        peer: P,
        metrics: Arc<BridgeMetrics>,
    ) -> (BridgeHandle, JoinHandle<()>)
    where
        H: BridgeHost + Send + 'static,
        P: PeerTarget + Send + 'static,
    {
        let mut bridge = EditorBridge::with_metrics(settings, host, metrics)
            .with_clock(|| tokio::time::Instant::now().into_std());
        bridge.attach(peer);

        let (tx, rx) = mpsc::channel(settings.queue_capacity.max(1));
        let (shutdown, shutdown_rx) = watch::channel(false);
        let handle = BridgeHandle {
            bridge_id: bridge.id(),
            tx,
            shutdown,
        };
        let sweep_every = settings.sweep_interval();
        let deadlines = settings.request_timeout().is_some();

        let task = tokio::spawn(run_bridge(bridge, rx, shutdown_rx, sweep_every, deadlines));
        (handle, task)
    }
}

async fn run_bridge<H, P>(
    mut bridge: EditorBridge<H, P>,
    mut rx: mpsc::Receiver<BridgeCommand>,
    mut shutdown: watch::Receiver<bool>,
    sweep_every: std::time::Duration,
    deadlines: bool,
) where
    H: BridgeHost,
    P: PeerTarget,
{
    let mut sweep = tokio::time::interval(sweep_every);
    sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                // Err: every handle is gone.
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }

            cmd = rx.recv() => {
                match cmd {
                    None => break,
                    Some(BridgeCommand::Load(payload)) => {
                        bridge.supply_payload(payload);
                    }
                    Some(BridgeCommand::Save) => {
                        bridge.request_save();
                    }
                    Some(BridgeCommand::Run) => {
                        bridge.run();
                    }
                    Some(BridgeCommand::Stop) => {
                        bridge.stop();
                    }
                    Some(BridgeCommand::Thumbnail) => {
                        bridge.get_thumbnail();
                    }
                    Some(BridgeCommand::Deliver(text)) => bridge.handle_message(&text),
                }
            }

            _ = sweep.tick(), if deadlines => {
                bridge.poll_timeouts();
            }
        }
    }

    rx.close();
    bridge.unmount();
}

/// `BridgeHost` that forwards every callback into an unbounded queue.
#[derive(Clone)]
pub struct ChannelHost {
    tx: mpsc::UnboundedSender<HostEvent>,
}

impl ChannelHost {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HostEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn emit(&self, event: HostEvent) {
        // Receiver gone means nobody is listening any more.
        let _ = self.tx.send(event);
    }
}

impl BridgeHost for ChannelHost {
    fn on_runtime_loaded(&self) {
        self.emit(HostEvent::RuntimeLoaded);
    }
    fn on_ready(&self) {
        self.emit(HostEvent::Ready);
    }
    fn on_save(&self, payload: ProjectPayload) {
        self.emit(HostEvent::Saved(payload));
    }
    fn on_thumbnail(&self, image: String) {
        self.emit(HostEvent::Thumbnail(image));
    }
    fn on_project_change(&self) {
        self.emit(HostEvent::Changed);
    }
    fn on_error(&self, err: &BridgeError) {
        self.emit(HostEvent::error(err));
    }
}
