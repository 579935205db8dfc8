//! Mount options passed from JavaScript.
//!
//! Callbacks are read separately (see `host::Callbacks`); this struct only
//! carries the plain settings, so unknown keys such as `onSave` are ignored.

use serde::Deserialize;
use wasm_bindgen::JsValue;

use scratchbridge_core::error::Result;
use scratchbridge_host::config::{BridgeMode, BridgeSection};

/// Global the command handle is published under unless overridden.
pub const DEFAULT_GLOBAL_NAME: &str = "scratchEditor";

/// Window event the editor toolbar dispatches to ask for a save.
pub const DEFAULT_SAVE_EVENT: &str = "scratch-save-request";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MountSettings {
    #[serde(default)]
    pub host_source: Option<String>,
    #[serde(default)]
    pub peer_source: Option<String>,
    #[serde(default)]
    pub mode: Option<BridgeMode>,
    /// `""` disables publishing the global handle.
    #[serde(default)]
    pub global_name: Option<String>,
    /// `""` disables the save-request listener.
    #[serde(default)]
    pub save_event: Option<String>,
}

impl MountSettings {
    pub fn from_js(options: &JsValue) -> std::result::Result<Self, JsValue> {
        if options.is_undefined() || options.is_null() {
            return Ok(Self::default());
        }
        serde_wasm_bindgen::from_value(options.clone())
            .map_err(|e| JsValue::from_str(&format!("invalid mount options: {e}")))
    }

    pub fn to_section(&self) -> Result<BridgeSection> {
        let mut section = BridgeSection::default();
        if let Some(source) = &self.host_source {
            section.host_source = source.clone();
        }
        if let Some(source) = &self.peer_source {
            section.peer_source = source.clone();
        }
        if let Some(mode) = self.mode {
            section.mode = mode;
        }
        section.validate()?;
        Ok(section)
    }

    pub fn global_name(&self) -> Option<&str> {
        match self.global_name.as_deref() {
            None => Some(DEFAULT_GLOBAL_NAME),
            Some("") => None,
            Some(name) => Some(name),
        }
    }

    pub fn save_event(&self) -> Option<&str> {
        match self.save_event.as_deref() {
            None => Some(DEFAULT_SAVE_EVENT),
            Some("") => None,
            Some(event) => Some(event),
        }
    }
}
