//! Persistence provider for a replica's files.
//!
//! A replica keeps three files:
//! - pending: JSON array of open tasks
//! - archived: JSON array of archived tasks
//! - backlog: the local change log (see [`crate::backlog`])
//!
//! The [`Store`] trait abstracts over where they live so the orchestrator and
//! the CLI can be exercised against [`MemoryStore`] in tests.
//!
//! # Save semantics
//!
//! `save` splits records by status: Pending to the pending file, Archived to
//! the archive file, everything else dropped. Every record flagged
//! `is_modified` is appended to the backlog. Callers clear the flags after a
//! successful save.

mod file;
mod memory;

pub use file::{FileStore, StorePaths};
pub use memory::MemoryStore;

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use todo_core::TaskList;
use todo_types::{TaskRecord, TaskStatus};

use crate::backlog::LogError;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O failed.
    #[error("{path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A pending or archive file is not a valid JSON array of records.
    #[error("{path} is not a valid task file: {source}")]
    Json {
        /// File path.
        path: PathBuf,
        /// Decode error.
        #[source]
        source: serde_json::Error,
    },

    /// Change log failure.
    #[error(transparent)]
    Log(#[from] LogError),
}

impl StoreError {
    /// Whether a task file does not exist yet.
    pub fn is_not_found(&self) -> bool {
        match self {
            StoreError::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
            StoreError::Log(e) => e.is_not_found(),
            StoreError::Json { .. } => false,
        }
    }
}

/// Where a replica keeps its records.
#[async_trait]
pub trait Store: Send + Sync {
    /// Create whatever is missing. Returns `true` if anything was created.
    async fn initialize(&self) -> Result<bool, StoreError>;

    /// Records in the pending file.
    async fn load_pending(&self) -> Result<Vec<TaskRecord>, StoreError>;

    /// Records in the archive file.
    async fn load_archived(&self) -> Result<Vec<TaskRecord>, StoreError>;

    /// The local change log. A missing log is empty.
    async fn load_backlog(&self) -> Result<Vec<TaskRecord>, StoreError>;

    /// Append to the local change log.
    async fn append_backlog(&self, records: &[TaskRecord]) -> Result<(), StoreError>;

    /// Remove the local change log.
    async fn delete_backlog(&self) -> Result<(), StoreError>;

    /// Persist `records` (see the module docs for the split).
    async fn save(&self, records: &[TaskRecord]) -> Result<(), StoreError>;

    /// Pending and archived records as one list.
    async fn load_list(&self) -> Result<TaskList, StoreError> {
        let mut list = TaskList::from_records(self.load_pending().await?);
        list.load(self.load_archived().await?);
        Ok(list)
    }
}

/// Split records into (pending, archived, modified) as `save` persists them.
pub(crate) fn partition(
    records: &[TaskRecord],
) -> (Vec<TaskRecord>, Vec<TaskRecord>, Vec<TaskRecord>) {
    let by_status = |status: TaskStatus| {
        records
            .iter()
            .filter(|r| r.status == status)
            .cloned()
            .collect::<Vec<_>>()
    };
    let modified = records.iter().filter(|r| r.is_modified).cloned().collect();
    (
        by_status(TaskStatus::Pending),
        by_status(TaskStatus::Archived),
        modified,
    )
}
