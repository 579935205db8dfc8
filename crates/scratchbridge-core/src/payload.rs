//! Opaque project payload.
//!
//! The payload is a base64-encoded project archive or a JSON document; the
//! bridge never looks inside. Clones share one buffer so re-offering the
//! same payload is cheap to detect.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque project data forwarded between host and peer.
#[derive(Clone)]
pub struct ProjectPayload(Arc<str>);

impl ProjectPayload {
    pub fn new(data: impl Into<Arc<str>>) -> Self {
        Self(data.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for ProjectPayload {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for ProjectPayload {}

// Payloads can be megabytes of base64; keep Debug output short.
impl fmt::Debug for ProjectPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectPayload")
            .field("len", &self.0.len())
            .finish()
    }
}

impl From<String> for ProjectPayload {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for ProjectPayload {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for ProjectPayload {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for ProjectPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ProjectPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}
