//! In-flight request tracking for save and thumbnail.
//!
//! Requests are matched to answers by event type only; a second request of
//! the same type while one is outstanding keeps the first start time.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use scratchbridge_core::protocol::PeerEventKind;

#[derive(Debug, Default)]
pub struct PendingRequests {
    timeout: Option<Duration>,
    inflight: HashMap<PeerEventKind, Instant>,
}

impl PendingRequests {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            inflight: HashMap::new(),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn arm(&mut self, answer: PeerEventKind, now: Instant) {
        self.inflight.entry(answer).or_insert(now);
    }

    /// Answer arrived. Returns how long the request was outstanding.
    pub fn settle(&mut self, answer: PeerEventKind, now: Instant) -> Option<Duration> {
        self.inflight
            .remove(&answer)
            .map(|started| now.saturating_duration_since(started))
    }

    /// Remove and return every request past its deadline.
    /// Always empty when no timeout is configured.
    pub fn expire(&mut self, now: Instant) -> Vec<PeerEventKind> {
        let Some(timeout) = self.timeout else {
            return Vec::new();
        };
        let mut expired: Vec<PeerEventKind> = self
            .inflight
            .iter()
            .filter(|(_, started)| now.saturating_duration_since(**started) >= timeout)
            .map(|(kind, _)| *kind)
            .collect();
        for kind in &expired {
            self.inflight.remove(kind);
        }
        expired.sort_by_key(|k| k.as_str());
        expired
    }

    pub fn is_pending(&self, answer: PeerEventKind) -> bool {
        self.inflight.contains_key(&answer)
    }

    pub fn clear(&mut self) {
        self.inflight.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_timeout_never_expires() {
        let t0 = Instant::now();
        let mut r = PendingRequests::new(None);
        r.arm(PeerEventKind::ProjectSaved, t0);
        assert!(r.expire(t0 + Duration::from_secs(3600)).is_empty());
        assert!(r.is_pending(PeerEventKind::ProjectSaved));
    }

    #[test]
    fn expires_once_after_deadline() {
        let t0 = Instant::now();
        let mut r = PendingRequests::new(Some(Duration::from_secs(5)));
        r.arm(PeerEventKind::ProjectSaved, t0);
        r.arm(PeerEventKind::Thumbnail, t0 + Duration::from_secs(3));
        assert!(r.expire(t0 + Duration::from_secs(4)).is_empty());
        assert_eq!(
            r.expire(t0 + Duration::from_secs(5)),
            vec![PeerEventKind::ProjectSaved]
        );
        assert!(r.expire(t0 + Duration::from_secs(6)).is_empty());
        assert_eq!(
            r.expire(t0 + Duration::from_secs(8)),
            vec![PeerEventKind::Thumbnail]
        );
    }

    #[test]
    fn rearm_keeps_first_start() {
        let t0 = Instant::now();
        let mut r = PendingRequests::new(None);
        r.arm(PeerEventKind::ProjectSaved, t0);
        r.arm(PeerEventKind::ProjectSaved, t0 + Duration::from_secs(2));
        assert_eq!(
            r.settle(PeerEventKind::ProjectSaved, t0 + Duration::from_secs(3)),
            Some(Duration::from_secs(3))
        );
        assert_eq!(r.settle(PeerEventKind::ProjectSaved, t0), None);
    }
}
