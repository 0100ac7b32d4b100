//! Identity types for todosync.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A globally unique identifier for a task record.
///
/// UUID v4, written to disk as a lowercase hyphenated string. Stable across
/// replicas and across re-synchronisations; the display id is not.
///
/// Ordering compares the raw 16 bytes, which matches ordering of the
/// hyphenated lowercase string form.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskUuid(uuid::Uuid);

impl TaskUuid {
    /// Create a new random TaskUuid.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Create a TaskUuid from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        uuid::Uuid::from_slice(bytes).ok().map(Self)
    }

    /// Get the raw bytes of this TaskUuid.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for TaskUuid {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for TaskUuid {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for TaskUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TaskUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskUuid({})", self.0)
    }
}
