#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::sync::Arc;

use common::{event, event_from, mounted, Call, ClosedPeer, CountingHost, RecordingPeer};
use scratchbridge_core::error::ErrorCode;
use scratchbridge_core::protocol::{EventOutcome, HostCommand, PeerEventKind};
use scratchbridge_host::config::{BridgeMode, BridgeSection};
use scratchbridge_host::obs::BridgeMetrics;
use scratchbridge_host::session::Intake;
use scratchbridge_host::EditorBridge;

fn ready_event() -> String {
    event(PeerEventKind::EditorReady, None)
}

#[test]
fn same_payload_twice_loads_once() {
    let (mut bridge, _host, peer) = mounted(&BridgeSection::default());
    bridge.handle_message(&ready_event());

    assert!(matches!(bridge.supply_payload("UEsDBBQ="), Intake::Dispatch(_)));
    assert_eq!(bridge.supply_payload("UEsDBBQ="), Intake::Duplicate);
    assert_eq!(peer.loads(), vec!["UEsDBBQ=".to_string()]);
}

#[test]
fn queued_payload_flushes_after_ready_only() {
    let (mut bridge, _host, peer) = mounted(&BridgeSection::default());

    assert_eq!(bridge.supply_payload("A"), Intake::Queued);
    assert!(peer.commands().is_empty(), "nothing may be sent before ready");

    bridge.handle_message(&ready_event());
    assert_eq!(peer.loads(), vec!["A".to_string()]);

    // The flushed payload counts as loaded.
    assert_eq!(bridge.supply_payload("A"), Intake::Duplicate);
    assert_eq!(peer.loads().len(), 1);
}

#[test]
fn newest_pending_payload_wins() {
    let (mut bridge, _host, peer) = mounted(&BridgeSection::default());
    bridge.supply_payload("A");
    bridge.supply_payload("B");
    bridge.handle_message(&ready_event());

    assert_eq!(peer.loads(), vec!["B".to_string()]);
}

#[test]
fn readiness_never_reverts() {
    let (mut bridge, host, _peer) = mounted(&BridgeSection::default());
    bridge.handle_message(&event(PeerEventKind::EditorLoaded, None));
    bridge.handle_message(&ready_event());
    assert!(bridge.is_ready());
    assert!(!bridge.is_loading());

    for kind in PeerEventKind::ALL {
        bridge.handle_message(&event(kind, Some(EventOutcome::failure("boom"))));
        assert!(bridge.is_ready(), "{} reverted readiness", kind.as_str());
        assert!(!bridge.is_loading(), "{} re-entered loading", kind.as_str());
    }

    // Lifecycle callbacks fire on the first transition only.
    let calls = host.calls();
    assert_eq!(calls.iter().filter(|c| **c == Call::Ready).count(), 1);
    assert_eq!(calls.iter().filter(|c| **c == Call::RuntimeLoaded).count(), 1);
}

#[test]
fn loading_and_ready_are_independent() {
    let (mut bridge, _host, _peer) = mounted(&BridgeSection::default());
    bridge.handle_message(&ready_event());
    assert!(bridge.is_ready());
    assert!(bridge.is_loading());

    bridge.handle_message(&event(PeerEventKind::EditorLoaded, None));
    assert!(!bridge.is_loading());
}

#[test]
fn foreign_messages_change_nothing() {
    let (mut bridge, host, peer) = mounted(&BridgeSection::default());
    bridge.supply_payload("A");

    for kind in PeerEventKind::ALL {
        let ok = EventOutcome::success(Some("X".into()));
        bridge.handle_message(&event_from("host-parent", kind, Some(ok.clone())));
        bridge.handle_message(&event_from("someone-else", kind, Some(ok)));
    }
    bridge.handle_message("not json at all");
    bridge.handle_message(r#"{"source":"embedded-editor"}"#);

    assert!(host.calls().is_empty());
    assert!(peer.commands().is_empty());
    assert!(!bridge.is_ready());
    assert!(bridge.is_loading());
    assert_eq!(bridge.session().pending_payload().map(|p| p.as_str()), Some("A"));
}

#[test]
fn save_round_trip_invokes_on_save_once() {
    let (mut bridge, host, peer) = mounted(&BridgeSection::default());
    bridge.handle_message(&ready_event());
    let before = host.calls().len();

    assert!(bridge.request_save());
    assert_eq!(peer.commands(), vec![HostCommand::SaveProject]);

    bridge.handle_message(&event(
        PeerEventKind::ProjectSaved,
        Some(EventOutcome::success(Some("X".into()))),
    ));

    assert_eq!(host.calls()[before..], [Call::Save("X".into())]);
    assert!(bridge.is_ready());
    assert!(bridge.session().pending_payload().is_none());
    assert!(bridge.session().last_loaded_payload().is_none());
}

#[test]
fn thumbnail_round_trip() {
    let (mut bridge, host, peer) = mounted(&BridgeSection::default());
    assert!(bridge.get_thumbnail());
    assert_eq!(peer.commands(), vec![HostCommand::GetThumbnail]);

    bridge.handle_message(&event(
        PeerEventKind::Thumbnail,
        Some(EventOutcome::success(Some("data:image/png;base64,iVBOR".into()))),
    ));
    assert_eq!(host.calls(), vec![Call::Thumbnail("data:image/png;base64,iVBOR".into())]);
}

#[test]
fn failed_load_reports_once_and_keeps_state() {
    let metrics = Arc::new(BridgeMetrics::default());
    let host = CountingHost::default();
    let peer = RecordingPeer::default();
    let mut bridge = EditorBridge::with_metrics(&BridgeSection::default(), host.clone(), Arc::clone(&metrics));
    bridge.attach(peer);
    bridge.handle_message(&ready_event());

    bridge.handle_message(&event(
        PeerEventKind::ProjectLoaded,
        Some(EventOutcome::failure("corrupt archive")),
    ));

    assert!(bridge.is_ready());
    assert!(bridge.is_loading());
    assert_eq!(host.errors(), vec![ErrorCode::PeerFailure]);
    assert_eq!(metrics.peer_failures.get(&[("event", "PROJECT_LOADED")]), 1);
}

#[test]
fn failed_save_and_thumbnail_report_errors() {
    let (mut bridge, host, _peer) = mounted(&BridgeSection::default());
    bridge.handle_message(&event(PeerEventKind::ProjectSaved, Some(EventOutcome::failure("disk full"))));
    bridge.handle_message(&event(PeerEventKind::Thumbnail, None));
    bridge.handle_message(r#"{"source":"embedded-editor","type":"PROJECT_SAVED","data":"oops"}"#);

    assert_eq!(
        host.errors(),
        vec![ErrorCode::PeerFailure, ErrorCode::PeerFailure, ErrorCode::PeerFailure]
    );
    assert!(!host.calls().iter().any(|c| matches!(c, Call::Save(_) | Call::Thumbnail(_))));
}

#[test]
fn unsupported_environment_is_fatal() {
    let (mut bridge, host, _peer) = mounted(&BridgeSection::default());
    bridge.handle_message(&event(PeerEventKind::BrowserNotSupported, None));
    assert_eq!(host.errors(), vec![ErrorCode::UnsupportedEnvironment]);
}

#[test]
fn project_change_notifies_host() {
    let (mut bridge, host, _peer) = mounted(&BridgeSection::default());
    bridge.handle_message(&event(PeerEventKind::ProjectChanged, None));
    bridge.handle_message(&event(PeerEventKind::ProjectChanged, None));
    assert_eq!(host.calls(), vec![Call::Changed, Call::Changed]);
}

#[test]
fn unknown_event_types_are_ignored() {
    let metrics = Arc::new(BridgeMetrics::default());
    let host = CountingHost::default();
    let mut bridge: EditorBridge<_, RecordingPeer> =
        EditorBridge::with_metrics(&BridgeSection::default(), host.clone(), Arc::clone(&metrics));

    bridge.handle_message(r#"{"source":"embedded-editor","type":"SPRITE_SELECTED","data":{"id":3}}"#);
    assert!(host.calls().is_empty());
    assert_eq!(metrics.ignored.get(&[("reason", "unknown_type")]), 1);
}

#[test]
fn late_events_after_unmount_are_dropped() {
    let (mut bridge, host, peer) = mounted(&BridgeSection::default());
    bridge.handle_message(&ready_event());
    bridge.request_save();
    let calls_before = host.calls().len();
    let sent_before = peer.commands().len();

    bridge.unmount();
    bridge.handle_message(&event(
        PeerEventKind::ProjectSaved,
        Some(EventOutcome::success(Some("late".into()))),
    ));
    bridge.handle_message(&event(PeerEventKind::ProjectChanged, None));

    assert_eq!(host.calls().len(), calls_before);
    assert!(!bridge.request_save());
    assert!(!bridge.run());
    assert_eq!(bridge.supply_payload("B"), Intake::Empty);
    assert_eq!(peer.commands().len(), sent_before);
    assert!(!bridge.is_mounted());
}

#[test]
fn commands_without_peer_are_dropped_silently() {
    let metrics = Arc::new(BridgeMetrics::default());
    let host = CountingHost::default();
    let mut bridge: EditorBridge<_, RecordingPeer> =
        EditorBridge::with_metrics(&BridgeSection::default(), host.clone(), Arc::clone(&metrics));

    assert!(!bridge.run());
    assert!(!bridge.stop());
    assert!(!bridge.request_save());
    assert!(!bridge.is_awaiting(PeerEventKind::ProjectSaved));
    assert!(host.calls().is_empty());
    assert_eq!(
        metrics.commands.get(&[("type", "RUN_PROJECT"), ("outcome", "dropped")]),
        1
    );
}

#[test]
fn refused_post_is_not_an_error() {
    let host = CountingHost::default();
    let mut bridge = EditorBridge::new(&BridgeSection::default(), host.clone());
    bridge.attach(ClosedPeer);
    assert!(!bridge.stop());
    assert!(host.calls().is_empty());
}

#[test]
fn player_mode_runs_after_successful_load() {
    let settings = BridgeSection {
        mode: BridgeMode::Player,
        ..BridgeSection::default()
    };
    let (mut bridge, _host, peer) = mounted(&settings);
    bridge.handle_message(&ready_event());
    bridge.supply_payload("A");

    bridge.handle_message(&event(PeerEventKind::ProjectLoaded, Some(EventOutcome::failure("bad"))));
    assert_eq!(peer.commands(), vec![HostCommand::LoadProject]);

    bridge.handle_message(&event(PeerEventKind::ProjectLoaded, Some(EventOutcome::success(None))));
    assert_eq!(peer.commands(), vec![HostCommand::LoadProject, HostCommand::RunProject]);
}

#[test]
fn custom_source_tags_are_honoured() {
    let settings = BridgeSection {
        host_source: "scratch-parent".into(),
        peer_source: "scratch-gui".into(),
        ..BridgeSection::default()
    };
    let (mut bridge, _host, peer) = mounted(&settings);

    bridge.handle_message(&ready_event());
    assert!(!bridge.is_ready(), "default peer tag must not match");

    bridge.handle_message(&event_from("scratch-gui", PeerEventKind::EditorReady, None));
    assert!(bridge.is_ready());

    bridge.run();
    assert_eq!(peer.sent.borrow()[0].source, "scratch-parent");
}

#[test]
fn empty_payload_is_ignored() {
    let (mut bridge, _host, peer) = mounted(&BridgeSection::default());
    bridge.handle_message(&ready_event());
    assert_eq!(bridge.supply_payload(""), Intake::Empty);
    assert!(peer.commands().is_empty());
}

#[test]
fn mounted_gauge_follows_lifecycle() {
    let metrics = Arc::new(BridgeMetrics::default());
    {
        let _bridge: EditorBridge<_, RecordingPeer> =
            EditorBridge::with_metrics(&BridgeSection::default(), CountingHost::default(), Arc::clone(&metrics));
        assert_eq!(metrics.mounted.get(&[]), 1);
    }
    assert_eq!(metrics.mounted.get(&[]), 0);

    let mut bridge: EditorBridge<_, RecordingPeer> =
        EditorBridge::with_metrics(&BridgeSection::default(), CountingHost::default(), Arc::clone(&metrics));
    bridge.unmount();
    bridge.unmount();
    drop(bridge);
    assert_eq!(metrics.mounted.get(&[]), 0);
}
