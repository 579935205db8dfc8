use std::time::Duration;

use serde::Deserialize;
use scratchbridge_core::error::{BridgeError, Result};
use scratchbridge_core::protocol::{DEFAULT_HOST_SOURCE, DEFAULT_PEER_SOURCE};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    pub version: u32,

    #[serde(default)]
    pub bridge: BridgeSection,

    #[serde(default)]
    pub store: Option<StoreSection>,
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(BridgeError::BadConfig(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.bridge.validate()?;
        if let Some(store) = &self.store {
            store.validate()?;
        }

        Ok(())
    }
}

/// How the embedded peer is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeMode {
    /// Full block editor; the host saves what the user builds.
    #[default]
    Editor,
    /// Read-only player; projects start running once loaded.
    Player,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeSection {
    #[serde(default = "default_host_source")]
    pub host_source: String,

    #[serde(default = "default_peer_source")]
    pub peer_source: String,

    #[serde(default)]
    pub mode: BridgeMode,

    /// 0 disables request deadlines.
    #[serde(default)]
    pub request_timeout_ms: u64,

    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,

    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            host_source: default_host_source(),
            peer_source: default_peer_source(),
            mode: BridgeMode::default(),
            request_timeout_ms: 0,
            sweep_interval_ms: default_sweep_interval_ms(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl BridgeSection {
    pub fn validate(&self) -> Result<()> {
        if self.host_source.trim().is_empty() || self.peer_source.trim().is_empty() {
            return Err(BridgeError::BadConfig(
                "bridge.host_source and bridge.peer_source must not be empty".into(),
            ));
        }
        if self.host_source == self.peer_source {
            return Err(BridgeError::BadConfig(
                "bridge.host_source must differ from bridge.peer_source".into(),
            ));
        }
        if self.request_timeout_ms != 0 && !(1000..=600000).contains(&self.request_timeout_ms) {
            return Err(BridgeError::BadConfig(
                "bridge.request_timeout_ms must be 0 or between 1000 and 600000".into(),
            ));
        }
        if !(50..=10000).contains(&self.sweep_interval_ms) {
            return Err(BridgeError::BadConfig(
                "bridge.sweep_interval_ms must be between 50 and 10000".into(),
            ));
        }
        if !(1..=65536).contains(&self.queue_capacity) {
            return Err(BridgeError::BadConfig(
                "bridge.queue_capacity must be between 1 and 65536".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

fn default_host_source() -> String {
    DEFAULT_HOST_SOURCE.into()
}
fn default_peer_source() -> String {
    DEFAULT_PEER_SOURCE.into()
}
fn default_sweep_interval_ms() -> u64 {
    250
}
fn default_queue_capacity() -> usize {
    1024
}

/// REST API the saved projects are persisted to.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    pub base_url: String,

    /// Bearer token; falls back to `SCRATCHBRIDGE_TOKEN` when absent.
    #[serde(default)]
    pub token: Option<String>,

    /// Title used when the first save creates a project.
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub project_id: Option<String>,
}

impl StoreSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(BridgeError::BadConfig(
                "store.base_url must be an http(s) url".into(),
            ));
        }
        if self.title.trim().is_empty() {
            return Err(BridgeError::BadConfig("store.title must not be empty".into()));
        }
        Ok(())
    }

    pub fn resolved_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var("SCRATCHBRIDGE_TOKEN").ok())
            .filter(|t| !t.is_empty())
    }
}

fn default_title() -> String {
    "Untitled project".into()
}
