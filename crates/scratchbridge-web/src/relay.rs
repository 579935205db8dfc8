//! Borrow discipline between the bridge and JavaScript callbacks.
//!
//! Bridge operations run with the bridge mutably borrowed and only queue
//! host events. The queue is drained after the borrow is released, so a
//! callback may call straight back into the bridge.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

pub type Outbox<E> = Rc<RefCell<VecDeque<E>>>;

pub struct Relay<B, E> {
    target: RefCell<B>,
    outbox: Outbox<E>,
    mounted: Cell<bool>,
}

impl<B, E> Relay<B, E> {
    pub fn new(target: B, outbox: Outbox<E>) -> Self {
        Self {
            target: RefCell::new(target),
            outbox,
            mounted: Cell::new(true),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    /// Run `f` on the target, then hand every queued event to `deliver`.
    ///
    /// `None` when unmounted, or when the target is already borrowed by an
    /// operation further up the stack.
    pub fn drive<R>(&self, f: impl FnOnce(&mut B) -> R, deliver: impl Fn(E)) -> Option<R> {
        if !self.is_mounted() {
            return None;
        }
        let out = {
            let mut target = self.target.try_borrow_mut().ok()?;
            f(&mut target)
        };
        self.flush(deliver);
        Some(out)
    }

    pub fn peek<R>(&self, f: impl FnOnce(&B) -> R) -> Option<R> {
        self.target.try_borrow().ok().map(|target| f(&target))
    }

    /// Mark unmounted, drop undelivered events and run `f` on the target.
    /// Returns false if already unmounted.
    pub fn shut_down(&self, f: impl FnOnce(&mut B)) -> bool {
        if !self.mounted.replace(false) {
            return false;
        }
        if let Ok(mut target) = self.target.try_borrow_mut() {
            f(&mut target);
        }
        self.outbox.borrow_mut().clear();
        true
    }

    fn flush(&self, deliver: impl Fn(E)) {
        loop {
            // Released before `deliver`: callbacks may queue more events.
            let next = self.outbox.borrow_mut().pop_front();
            match next {
                Some(event) => deliver(event),
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    use scratchbridge_core::error::{BridgeError, Result};
    use scratchbridge_core::protocol::{HostCommand, HostEnvelope, PeerEnvelope, PeerEventKind};
    use scratchbridge_core::ProjectPayload;
    use scratchbridge_host::config::BridgeSection;
    use scratchbridge_host::transport::PeerTarget;
    use scratchbridge_host::{BridgeHost, EditorBridge, HostEvent};

    struct QueueHost(Outbox<HostEvent>);

    impl BridgeHost for QueueHost {
        fn on_runtime_loaded(&self) {
            self.0.borrow_mut().push_back(HostEvent::RuntimeLoaded);
        }
        fn on_ready(&self) {
            self.0.borrow_mut().push_back(HostEvent::Ready);
        }
        fn on_save(&self, payload: ProjectPayload) {
            self.0.borrow_mut().push_back(HostEvent::Saved(payload));
        }
        fn on_thumbnail(&self, image: String) {
            self.0.borrow_mut().push_back(HostEvent::Thumbnail(image));
        }
        fn on_project_change(&self) {
            self.0.borrow_mut().push_back(HostEvent::Changed);
        }
        fn on_error(&self, err: &BridgeError) {
            self.0.borrow_mut().push_back(HostEvent::error(err));
        }
    }

    #[derive(Clone, Default)]
    struct Posted(Rc<RefCell<Vec<HostCommand>>>);

    impl PeerTarget for Posted {
        fn post(&self, env: &HostEnvelope) -> Result<()> {
            self.0.borrow_mut().push(env.command);
            Ok(())
        }
    }

    type TestRelay = Relay<EditorBridge<QueueHost, Posted>, HostEvent>;

    fn relay() -> (TestRelay, Posted) {
        let outbox = Outbox::default();
        let posted = Posted::default();
        let mut bridge = EditorBridge::new(&BridgeSection::default(), QueueHost(Rc::clone(&outbox))).without_clock();
        bridge.attach(posted.clone());
        (Relay::new(bridge, outbox), posted)
    }

    fn peer_event(kind: PeerEventKind) -> String {
        PeerEnvelope::event("embedded-editor", kind, None)
            .unwrap()
            .to_json()
            .unwrap()
    }

    #[test]
    fn callback_can_call_back_into_the_bridge() {
        let (relay, posted) = relay();
        let seen = RefCell::new(Vec::new());

        let ready = peer_event(PeerEventKind::EditorReady);
        relay
            .drive(
                |bridge| bridge.handle_message(&ready),
                |event| {
                    if event == HostEvent::Ready {
                        let saved = relay.drive(|bridge| bridge.request_save(), |e| seen.borrow_mut().push(e));
                        assert_eq!(saved, Some(true));
                    }
                    seen.borrow_mut().push(event);
                },
            )
            .unwrap();

        assert_eq!(*seen.borrow(), vec![HostEvent::Ready]);
        assert_eq!(*posted.0.borrow(), vec![HostCommand::SaveProject]);
        assert_eq!(relay.peek(|bridge| bridge.is_ready()), Some(true));
    }

    #[test]
    fn events_queued_by_a_callback_are_delivered_in_order() {
        let (relay, _posted) = relay();
        let seen = RefCell::new(Vec::new());

        let loaded = peer_event(PeerEventKind::EditorLoaded);
        let ready = peer_event(PeerEventKind::EditorReady);
        relay.drive(
            |bridge| bridge.handle_message(&loaded),
            |event| {
                seen.borrow_mut().push(event);
                relay.drive(|bridge| bridge.handle_message(&ready), |e| seen.borrow_mut().push(e));
            },
        );

        assert_eq!(*seen.borrow(), vec![HostEvent::RuntimeLoaded, HostEvent::Ready]);
    }

    #[test]
    fn nested_borrow_is_refused() {
        let (relay, posted) = relay();
        let inner = relay.peek(|_| relay.drive(|bridge| bridge.run(), |_| {}));
        assert_eq!(inner, Some(None));
        assert!(posted.0.borrow().is_empty());
    }

    #[test]
    fn shut_down_relay_ignores_work() {
        let (relay, posted) = relay();
        relay.outbox.borrow_mut().push_back(HostEvent::Changed);

        assert!(relay.shut_down(|bridge| bridge.unmount()));
        assert!(!relay.shut_down(|bridge| bridge.unmount()));
        assert!(relay.outbox.borrow().is_empty());
        assert_eq!(relay.drive(|bridge| bridge.run(), |_| panic!("no delivery")), None);
        assert!(posted.0.borrow().is_empty());
        assert_eq!(relay.peek(|bridge| bridge.is_mounted()), Some(false));
    }

    #[test]
    fn unmount_from_a_callback_drops_the_rest() {
        let (relay, _posted) = relay();
        let seen = RefCell::new(Vec::new());
        let loaded = peer_event(PeerEventKind::EditorLoaded);
        let ready = peer_event(PeerEventKind::EditorReady);

        relay.drive(
            |bridge| {
                bridge.handle_message(&loaded);
                bridge.handle_message(&ready);
            },
            |event| {
                seen.borrow_mut().push(event);
                relay.shut_down(|bridge| bridge.unmount());
            },
        );

        assert_eq!(*seen.borrow(), vec![HostEvent::RuntimeLoaded]);
    }
}
