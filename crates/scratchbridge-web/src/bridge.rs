use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlIFrameElement, MessageEvent, Window};

use scratchbridge_core::error::BridgeError;
use scratchbridge_host::session::Intake;
use scratchbridge_host::{EditorBridge, HostEvent};

use crate::host::{Callbacks, JsHost, Outbox};
use crate::options::MountSettings;
use crate::peer::IframePeer;
use crate::relay::Relay;
use crate::teardown::{Claim, GlobalSlots, ListenerSite, Listeners};

type Bridge = EditorBridge<JsHost, IframePeer>;
type WindowListener = Closure<dyn FnMut(Event)>;

#[derive(Clone, Copy)]
enum Command {
    Save,
    Run,
    Stop,
    Thumbnail,
}

/// State reachable from the window listeners and the published handle.
struct Shared {
    relay: Relay<Bridge, HostEvent>,
    callbacks: Callbacks,
}

impl Shared {
    fn drive<R>(&self, f: impl FnOnce(&mut Bridge) -> R) -> Option<R> {
        let out = self.relay.drive(f, |event| self.callbacks.fire(event));
        if out.is_none() && self.relay.is_mounted() {
            web_sys::console::warn_1(&JsValue::from_str("[scratchbridge] re-entrant bridge call ignored"));
        }
        out
    }

    fn command(&self, command: Command) -> bool {
        self.drive(|bridge| match command {
            Command::Save => bridge.request_save(),
            Command::Run => bridge.run(),
            Command::Stop => bridge.stop(),
            Command::Thumbnail => bridge.get_thumbnail(),
        })
        .unwrap_or(false)
    }
}

impl ListenerSite for Window {
    type Listener = WindowListener;
    type Error = JsValue;

    fn remove(&self, event: &str, listener: &WindowListener) -> Result<(), JsValue> {
        self.remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
    }
}

impl GlobalSlots for Window {
    type Value = JsValue;

    fn current(&self, name: &str) -> Option<JsValue> {
        Reflect::get(self, &JsValue::from_str(name)).ok()
    }

    fn same(&self, a: &JsValue, b: &JsValue) -> bool {
        Object::is(a, b)
    }

    fn delete(&self, name: &str) {
        let _ = Reflect::delete_property(self, &JsValue::from_str(name));
    }
}

/// Bridge between the host page and an embedded editor iframe.
///
/// ```js
/// const bridge = new WebBridge(iframe, { onSave: (sb3) => api.save(sb3) });
/// bridge.supplyPayload(project.projectJson.sb3);
/// // later
/// bridge.unmount();
/// ```
#[wasm_bindgen]
pub struct WebBridge {
    shared: Rc<Shared>,
    window: Window,
    listeners: Listeners<WindowListener>,
    claim: RefCell<Option<Claim<JsValue>>>,
}

#[wasm_bindgen]
impl WebBridge {
    /// Mount on `iframe` and start listening for peer messages.
    #[wasm_bindgen(constructor)]
    pub fn mount(iframe: HtmlIFrameElement, options: JsValue) -> Result<WebBridge, JsValue> {
        console_error_panic_hook::set_once();

        let settings = MountSettings::from_js(&options)?;
        let section = settings.to_section().map_err(to_js_error)?;
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

        let outbox = Outbox::default();
        // Instant is unavailable on wasm32.
        let mut bridge = EditorBridge::new(&section, JsHost::new(Rc::clone(&outbox))).without_clock();
        bridge.attach(IframePeer::new(iframe));

        let shared = Rc::new(Shared {
            relay: Relay::new(bridge, outbox),
            callbacks: Callbacks::from_options(&options),
        });

        let web = WebBridge {
            shared,
            window,
            listeners: Listeners::default(),
            claim: RefCell::new(None),
        };

        let on_message = {
            let shared = Rc::clone(&web.shared);
            Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                // The channel is shared with every other window message;
                // anything that is not JSON-shaped is just foreign noise.
                let Some(event) = event.dyn_ref::<MessageEvent>() else {
                    return;
                };
                let Ok(text) = js_sys::JSON::stringify(&event.data()) else {
                    return;
                };
                let Some(text) = text.as_string() else {
                    return;
                };
                shared.drive(|bridge| bridge.handle_message(&text));
            })
        };
        web.listen("message", on_message)?;

        if let Some(name) = settings.save_event() {
            let shared = Rc::clone(&web.shared);
            let on_save_request = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                shared.command(Command::Save);
            });
            web.listen(name, on_save_request)?;
        }

        if let Some(name) = settings.global_name() {
            let claim = web.publish(name)?;
            *web.claim.borrow_mut() = Some(claim);
        }
        Ok(web)
    }

    /// Offer project data. Returns false when nothing will be loaded
    /// (empty, already loaded, or unmounted).
    #[wasm_bindgen(js_name = supplyPayload)]
    pub fn supply_payload(&self, payload: String) -> bool {
        matches!(
            self.shared.drive(|bridge| bridge.supply_payload(payload)),
            Some(Intake::Dispatch(_) | Intake::Queued)
        )
    }

    #[wasm_bindgen(js_name = requestSave)]
    pub fn request_save(&self) -> bool {
        self.shared.command(Command::Save)
    }

    #[wasm_bindgen(js_name = runProject)]
    pub fn run_project(&self) -> bool {
        self.shared.command(Command::Run)
    }

    #[wasm_bindgen(js_name = stopProject)]
    pub fn stop_project(&self) -> bool {
        self.shared.command(Command::Stop)
    }

    #[wasm_bindgen(js_name = getThumbnail)]
    pub fn get_thumbnail(&self) -> bool {
        self.shared.command(Command::Thumbnail)
    }

    #[wasm_bindgen(getter, js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.shared.relay.peek(|bridge| bridge.is_ready()).unwrap_or(false)
    }

    #[wasm_bindgen(getter, js_name = isLoading)]
    pub fn is_loading(&self) -> bool {
        self.shared.relay.peek(|bridge| bridge.is_loading()).unwrap_or(true)
    }

    /// Stop listening, remove the global handle and detach the iframe.
    /// Safe to call more than once.
    pub fn unmount(&self) {
        self.listeners.detach_all(&self.window, |event, e| {
            web_sys::console::warn_2(
                &JsValue::from_str(&format!("[scratchbridge] {event} listener removal failed")),
                &e,
            );
        });

        if let Some(claim) = self.claim.borrow_mut().take() {
            claim.release(&self.window);
        }

        self.shared.relay.shut_down(|bridge| bridge.unmount());
    }
}

impl WebBridge {
    fn listen(&self, event: &str, listener: WindowListener) -> Result<(), JsValue> {
        self.window
            .add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())?;
        self.listeners.push(event, listener);
        Ok(())
    }

    /// Publish the command handle under `name`.
    ///
    /// The functions hold only a weak reference and are owned by the JS
    /// object, so a caller that kept one gets `false` after unmount instead
    /// of a dropped-closure error.
    fn publish(&self, name: &str) -> Result<Claim<JsValue>, JsValue> {
        let object = Object::new();
        for (key, command) in [
            ("requestSave", Command::Save),
            ("runProject", Command::Run),
            ("stopProject", Command::Stop),
            ("getThumbnail", Command::Thumbnail),
        ] {
            let shared: Weak<Shared> = Rc::downgrade(&self.shared);
            let function = Closure::<dyn FnMut() -> bool>::new(move || {
                shared
                    .upgrade()
                    .map(|shared| shared.command(command))
                    .unwrap_or(false)
            });
            Reflect::set(&object, &JsValue::from_str(key), &function.into_js_value())?;
        }
        let object = JsValue::from(object);
        Reflect::set(&self.window, &JsValue::from_str(name), &object)?;
        Ok(Claim::new(name, object))
    }
}

impl Drop for WebBridge {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn to_js_error(err: BridgeError) -> JsValue {
    JsValue::from_str(&format!("{}: {err}", err.code().as_str()))
}
