//! Minimal metrics registry for the bridge.
//!
//! Counter/gauge/histogram types with dynamic labels backed by `DashMap`.
//! Labels are flattened into sorted key vectors to keep deterministic
//! ordering. Histogram buckets are fixed in milliseconds.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_key(labels: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut key: Vec<(String, String)> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn label_str(key: &[(String, String)]) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for an exact label set (0 if never touched).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{{{}}} {}", name, label_str(r.key()), val);
        }
    }
}

#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<Vec<(String, String)>, AtomicI64>,
}

impl GaugeVec {
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }
    pub fn dec(&self, labels: &[(&str, &str)]) {
        self.add(labels, -1);
    }

    pub fn add(&self, labels: &[(&str, &str)], v: i64) {
        let gauge = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicI64::new(0));
        gauge.fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> i64 {
        self.map
            .get(&label_key(labels))
            .map(|g| g.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} gauge", name);
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{{{}}} {}", name, label_str(r.key()), val);
        }
    }
}

// 50ms .. 60s: peers take a while to serialize large projects.
const BUCKETS_MILLIS: [u64; 8] = [50, 100, 250, 500, 1_000, 5_000, 15_000, 60_000];

#[derive(Default)]
struct AtomicHistogram {
    count: AtomicU64,
    sum: AtomicU64,
    buckets: [AtomicU64; 8],
}

#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<Vec<(String, String)>, AtomicHistogram>,
}

impl HistogramVec {
    /// Observe a duration into cumulative buckets (millisecond scale).
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self.map.entry(label_key(labels)).or_default();
        let millis = duration.as_millis() as u64;

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum.fetch_add(millis, Ordering::Relaxed);

        for (i, &b) in BUCKETS_MILLIS.iter().enumerate() {
            if millis <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn count(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|h| h.count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} histogram", name);
        for r in self.map.iter() {
            let hist = r.value();
            let labels = label_str(r.key());
            let prefix = if labels.is_empty() {
                String::new()
            } else {
                format!("{},", labels)
            };

            for (i, &le) in BUCKETS_MILLIS.iter().enumerate() {
                let count = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, le, count);
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, count);
            let sum = hist.sum.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_sum{{{}}} {}", name, labels, sum);
            let _ = writeln!(out, "{}_count{{{}}} {}", name, labels, count);
        }
    }
}

#[derive(Default)]
pub struct BridgeMetrics {
    /// Labels: `type`, `outcome` (`sent` | `dropped`).
    pub commands: CounterVec,
    /// Labels: `type`.
    pub events: CounterVec,
    /// Messages ignored for a foreign source or a bad envelope. Labels: `reason`.
    pub ignored: CounterVec,
    /// Labels: `event`.
    pub peer_failures: CounterVec,
    /// Labels: `event`.
    pub request_timeouts: CounterVec,
    /// Request -> answer latency. Labels: `event`.
    pub roundtrip: HistogramVec,
    pub mounted: GaugeVec,
}

impl BridgeMetrics {
    /// Render all metrics in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.commands.render("scratchbridge_commands_total", &mut out);
        self.events.render("scratchbridge_events_total", &mut out);
        self.ignored.render("scratchbridge_ignored_messages_total", &mut out);
        self.peer_failures.render("scratchbridge_peer_failures_total", &mut out);
        self.request_timeouts.render("scratchbridge_request_timeouts_total", &mut out);
        self.roundtrip.render("scratchbridge_request_roundtrip_millis", &mut out);
        self.mounted.render("scratchbridge_mounted", &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_order_independent() {
        let c = CounterVec::default();
        c.inc(&[("type", "SAVE_PROJECT"), ("outcome", "sent")]);
        c.inc(&[("outcome", "sent"), ("type", "SAVE_PROJECT")]);
        assert_eq!(c.get(&[("type", "SAVE_PROJECT"), ("outcome", "sent")]), 2);
        assert_eq!(c.get(&[("type", "RUN_PROJECT"), ("outcome", "sent")]), 0);
    }

    #[test]
    fn histogram_buckets_are_cumulative() {
        let m = BridgeMetrics::default();
        m.roundtrip.observe(&[("event", "PROJECT_SAVED")], Duration::from_millis(120));
        let text = m.render();
        assert!(text.contains("scratchbridge_request_roundtrip_millis_bucket{event=\"PROJECT_SAVED\",le=\"100\"} 0"));
        assert!(text.contains("scratchbridge_request_roundtrip_millis_bucket{event=\"PROJECT_SAVED\",le=\"250\"} 1"));
        assert!(text.contains("scratchbridge_request_roundtrip_millis_count{event=\"PROJECT_SAVED\"} 1"));
    }

    #[test]
    fn label_values_are_escaped() {
        let m = BridgeMetrics::default();
        m.ignored.inc(&[("reason", "bad \"json\"")]);
        assert!(m.render().contains("reason=\"bad \\\"json\\\"\""));
    }
}
