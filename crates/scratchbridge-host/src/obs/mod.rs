//! Lightweight in-process metrics.
//!
//! Counters, gauges and a latency histogram stored as atomics and rendered
//! as Prometheus text by whoever embeds the bridge.

pub mod metrics;

pub use metrics::BridgeMetrics;
