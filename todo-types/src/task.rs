//! The task record, the unit of data exchanged between replicas.
//!
//! Each change-log line is one [`TaskRecord`] serialised as JSON. Field names
//! are camelCase so logs written by earlier releases keep loading.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::{RecordError, TaskUuid};

/// Lifecycle state of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Open task, lives in the pending file.
    #[default]
    Pending,
    /// Finished or expired task, lives in the archive file.
    Archived,
    /// Removed task. Only ever present in change logs.
    Deleted,
    /// Sentinel marking the last synchronised position in a change log.
    Checkpoint,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Archived => "Archived",
            TaskStatus::Deleted => "Deleted",
            TaskStatus::Checkpoint => "Checkpoint",
        };
        f.write_str(name)
    }
}

/// A single todo, or a checkpoint marker when `status` is
/// [`TaskStatus::Checkpoint`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    /// Display id. Only meaningful within one replica until the next sync.
    #[serde(default)]
    pub id: u32,
    /// Replica-stable identity.
    pub uuid: TaskUuid,
    /// Free-text description.
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    /// Project memberships, in insertion order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: Vec<String>,
    /// Context memberships, in insertion order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub contexts: Vec<String>,
    /// Priority label, e.g. `H`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: String,
    /// Position of this record within each ordering set (`+proj`, `@ctx`, `all`).
    #[serde(default, deserialize_with = "null_as_default")]
    pub ordinals: BTreeMap<String, i64>,
    /// Creation time (RFC 3339) or empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_date: String,
    /// Last write time (RFC 3339) or empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub modified_date: String,
    /// Hide until this time.
    #[serde(default, deserialize_with = "null_as_default")]
    pub wait: String,
    /// Expire (archive) at this time.
    #[serde(default, deserialize_with = "null_as_default")]
    pub until: String,
    /// Due time.
    #[serde(default, deserialize_with = "null_as_default")]
    pub due: String,
    /// Whether the task is done.
    #[serde(default)]
    pub completed: bool,
    /// When the task was marked done.
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed_date: String,
    /// Lifecycle state.
    #[serde(default)]
    pub status: TaskStatus,
    /// Free-form notes.
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: Vec<String>,
    /// Needs appending to the local change log on the next save.
    #[serde(skip)]
    pub is_modified: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TaskRecord {
    /// Create a pending record with a fresh uuid.
    pub fn new() -> Self {
        Self {
            id: 0,
            uuid: TaskUuid::new(),
            subject: String::new(),
            projects: Vec::new(),
            contexts: Vec::new(),
            priority: String::new(),
            ordinals: BTreeMap::new(),
            created_date: String::new(),
            modified_date: String::new(),
            wait: String::new(),
            until: String::new(),
            due: String::new(),
            completed: false,
            completed_date: String::new(),
            status: TaskStatus::Pending,
            notes: Vec::new(),
            is_modified: false,
        }
    }

    /// Create a pending record with the given subject.
    pub fn with_subject(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Self::new()
        }
    }

    /// Create a checkpoint marker.
    ///
    /// An empty `modified_date` denotes the blank checkpoint synthesised
    /// before the first ever synchronisation.
    pub fn checkpoint(modified_date: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Checkpoint,
            modified_date: modified_date.into(),
            ..Self::new()
        }
    }

    /// Serialize to a single change-log line (no trailing newline).
    pub fn to_json_line(&self) -> Result<String, RecordError> {
        serde_json::to_string(self).map_err(RecordError::Serialization)
    }

    /// Deserialize from a single change-log line.
    pub fn from_json_line(line: &str) -> Result<Self, RecordError> {
        serde_json::from_str(line).map_err(RecordError::Deserialization)
    }

    /// Deserialize from the raw bytes of one change-log line.
    ///
    /// Bytes that are not valid UTF-8 are rejected, never replaced.
    pub fn from_json_slice(line: &[u8]) -> Result<Self, RecordError> {
        serde_json::from_slice(line).map_err(RecordError::Deserialization)
    }

    /// Whether this record is a checkpoint marker.
    pub fn is_checkpoint(&self) -> bool {
        self.status == TaskStatus::Checkpoint
    }

    /// Whether this record belongs to `project`.
    pub fn has_project(&self, project: &str) -> bool {
        self.projects.iter().any(|p| p == project)
    }

    /// Whether this record belongs to `context`.
    pub fn has_context(&self, context: &str) -> bool {
        self.contexts.iter().any(|c| c == context)
    }

    /// Mark done at `now`.
    pub fn complete(&mut self, now: &str) {
        self.completed = true;
        self.completed_date = now.to_string();
    }

    /// Clear the done flag.
    pub fn uncomplete(&mut self) {
        self.completed = false;
        self.completed_date.clear();
    }

    /// Move to the archive.
    pub fn archive(&mut self) {
        self.status = TaskStatus::Archived;
    }

    /// Move back to pending. An expiry date would archive it again, so it is cleared.
    pub fn unarchive(&mut self) {
        self.status = TaskStatus::Pending;
        self.until.clear();
    }

    /// Stamp a local write: modified now and queued for the change log.
    pub fn touch(&mut self, now: &str) {
        self.modified_date = now.to_string();
        self.is_modified = true;
    }

    /// Whether the subject is non-empty.
    pub fn is_valid(&self) -> bool {
        !self.subject.is_empty()
    }
}

impl Default for TaskRecord {
    fn default() -> Self {
        Self::new()
    }
}
