use serde::Serialize;
use web_sys::HtmlIFrameElement;

use scratchbridge_core::error::{BridgeError, Result};
use scratchbridge_core::protocol::HostEnvelope;
use scratchbridge_host::transport::PeerTarget;

/// The embedded editor's iframe. Messages go to its content window.
pub struct IframePeer {
    iframe: HtmlIFrameElement,
}

impl IframePeer {
    pub fn new(iframe: HtmlIFrameElement) -> Self {
        Self { iframe }
    }
}

impl PeerTarget for IframePeer {
    fn post(&self, env: &HostEnvelope) -> Result<()> {
        // No content window until the iframe is in the document.
        let target = self.iframe.content_window().ok_or(BridgeError::PeerDetached)?;
        let message = env
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| BridgeError::Internal(format!("envelope encode failed: {e}")))?;
        target
            .post_message(&message, "*")
            .map_err(|e| BridgeError::Internal(format!("postMessage failed: {e:?}")))
    }
}
