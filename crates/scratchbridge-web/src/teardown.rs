//! Window registrations and their removal on unmount.

use std::cell::RefCell;

/// Where event listeners are registered.
pub trait ListenerSite {
    type Listener;
    type Error;

    fn remove(&self, event: &str, listener: &Self::Listener) -> Result<(), Self::Error>;
}

/// Listeners a mount registered, in registration order.
pub struct Listeners<L> {
    entries: RefCell<Vec<(String, L)>>,
}

impl<L> Default for Listeners<L> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }
}

impl<L> Listeners<L> {
    pub fn push(&self, event: impl Into<String>, listener: L) {
        self.entries.borrow_mut().push((event.into(), listener));
    }

    /// Remove and drop every listener. A failed removal goes to `on_error`
    /// and does not stop the others.
    pub fn detach_all<S>(&self, site: &S, mut on_error: impl FnMut(&str, S::Error))
    where
        S: ListenerSite<Listener = L>,
    {
        let entries = std::mem::take(&mut *self.entries.borrow_mut());
        for (event, listener) in entries {
            if let Err(e) = site.remove(&event, &listener) {
                on_error(&event, e);
            }
        }
    }
}

/// Named global values, such as properties of `window`.
pub trait GlobalSlots {
    type Value;

    fn current(&self, name: &str) -> Option<Self::Value>;
    fn same(&self, a: &Self::Value, b: &Self::Value) -> bool;
    fn delete(&self, name: &str);
}

/// A global this mount published.
pub struct Claim<V> {
    name: String,
    value: V,
}

impl<V> Claim<V> {
    pub fn new(name: impl Into<String>, value: V) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Delete the global if it still holds our value; a newer mount may own
    /// it by now. Returns whether it was deleted.
    pub fn release<S>(self, slots: &S) -> bool
    where
        S: GlobalSlots<Value = V>,
    {
        match slots.current(&self.name) {
            Some(current) if slots.same(&current, &self.value) => {
                slots.delete(&self.name);
                true
            }
            _ => false,
        }
    }
}
