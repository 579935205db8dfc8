//! JavaScript side of the host callback surface.
//!
//! `JsHost` only records events while the bridge is borrowed; the owner
//! drains them through `Callbacks::fire` afterwards, so a callback may call
//! straight back into the bridge.

use js_sys::{Function, Reflect};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};

use scratchbridge_core::error::BridgeError;
use scratchbridge_core::ProjectPayload;
use scratchbridge_host::{BridgeHost, HostEvent};

pub type Outbox = crate::relay::Outbox<HostEvent>;

pub struct JsHost {
    outbox: Outbox,
}

impl JsHost {
    pub fn new(outbox: Outbox) -> Self {
        Self { outbox }
    }

    fn push(&self, event: HostEvent) {
        self.outbox.borrow_mut().push_back(event);
    }
}

impl BridgeHost for JsHost {
    fn on_runtime_loaded(&self) {
        self.push(HostEvent::RuntimeLoaded);
    }
    fn on_ready(&self) {
        self.push(HostEvent::Ready);
    }
    fn on_save(&self, payload: ProjectPayload) {
        self.push(HostEvent::Saved(payload));
    }
    fn on_thumbnail(&self, image: String) {
        self.push(HostEvent::Thumbnail(image));
    }
    fn on_project_change(&self) {
        self.push(HostEvent::Changed);
    }
    fn on_error(&self, err: &BridgeError) {
        if matches!(err, BridgeError::PeerFailure { .. } | BridgeError::UnsupportedEnvironment) {
            web_sys::console::error_2(&JsValue::from_str("[scratchbridge]"), &JsValue::from_str(&err.to_string()));
        }
        self.push(HostEvent::error(err));
    }
}

#[derive(Serialize)]
struct ErrorReport<'a> {
    code: &'a str,
    message: &'a str,
    fatal: bool,
}

/// Callback functions picked from the mount options object.
#[derive(Default)]
pub struct Callbacks {
    on_loaded: Option<Function>,
    on_ready: Option<Function>,
    on_save: Option<Function>,
    on_thumbnail: Option<Function>,
    on_project_change: Option<Function>,
    on_error: Option<Function>,
}

fn pick(options: &JsValue, name: &str) -> Option<Function> {
    if !options.is_object() {
        return None;
    }
    Reflect::get(options, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

impl Callbacks {
    pub fn from_options(options: &JsValue) -> Self {
        Self {
            on_loaded: pick(options, "onLoaded"),
            on_ready: pick(options, "onReady"),
            on_save: pick(options, "onSave"),
            on_thumbnail: pick(options, "onThumbnail"),
            on_project_change: pick(options, "onProjectChange"),
            on_error: pick(options, "onError"),
        }
    }

    pub fn fire(&self, event: HostEvent) {
        let this = JsValue::NULL;
        let result = match event {
            HostEvent::RuntimeLoaded => self.on_loaded.as_ref().map(|f| f.call0(&this)),
            HostEvent::Ready => self.on_ready.as_ref().map(|f| f.call0(&this)),
            HostEvent::Saved(payload) => self
                .on_save
                .as_ref()
                .map(|f| f.call1(&this, &JsValue::from_str(payload.as_str()))),
            HostEvent::Thumbnail(image) => self
                .on_thumbnail
                .as_ref()
                .map(|f| f.call1(&this, &JsValue::from_str(&image))),
            HostEvent::Changed => self.on_project_change.as_ref().map(|f| f.call0(&this)),
            HostEvent::Error { code, message, fatal } => self.on_error.as_ref().map(|f| {
                let report = ErrorReport {
                    code: code.as_str(),
                    message: &message,
                    fatal,
                };
                serde_wasm_bindgen::to_value(&report)
                    .map_err(JsValue::from)
                    .and_then(|arg| f.call1(&this, &arg))
            }),
        };
        if let Some(Err(thrown)) = result {
            web_sys::console::error_2(&JsValue::from_str("[scratchbridge] callback threw"), &thrown);
        }
    }
}
