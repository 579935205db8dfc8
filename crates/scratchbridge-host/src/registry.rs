//! Process-wide slot for the active bridge's command handle.
//!
//! Lets code outside the bridge's owner (a toolbar save button, a keyboard
//! shortcut) reach the live editor without threading a handle through.
//! Passing a `BridgeHandle` explicitly is preferred where possible.
//!
//! Single writer: installing overwrites the previous handle. Dropping the
//! returned [`Registration`] clears the slot only if it still holds that
//! bridge, so a late unmount never removes a newer mount.

use std::sync::{Arc, Mutex, MutexGuard};

/// Imperative commands reachable through the global slot.
pub trait CommandHandle: Send + Sync {
    fn bridge_id(&self) -> u64;
    fn request_save(&self) -> bool;
    fn run(&self) -> bool;
    fn stop(&self) -> bool;
    fn get_thumbnail(&self) -> bool;
}

static ACTIVE: Mutex<Option<Arc<dyn CommandHandle>>> = Mutex::new(None);

fn slot() -> MutexGuard<'static, Option<Arc<dyn CommandHandle>>> {
    // A panic while holding the lock leaves only a stale handle behind.
    ACTIVE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Keeps the handle installed; dropping it uninstalls.
#[must_use = "dropping the registration uninstalls the handle"]
pub struct Registration {
    bridge_id: u64,
}

impl Registration {
    pub fn bridge_id(&self) -> u64 {
        self.bridge_id
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut slot = slot();
        if slot.as_ref().map(|h| h.bridge_id()) == Some(self.bridge_id) {
            *slot = None;
            tracing::debug!(bridge = self.bridge_id, "global bridge handle removed");
        }
    }
}

pub fn install(handle: Arc<dyn CommandHandle>) -> Registration {
    let bridge_id = handle.bridge_id();
    let previous = slot().replace(handle);
    if let Some(prev) = previous {
        tracing::debug!(previous = prev.bridge_id(), bridge = bridge_id, "global bridge handle replaced");
    }
    Registration { bridge_id }
}

pub fn active() -> Option<Arc<dyn CommandHandle>> {
    slot().clone()
}
