//! In-memory store for testing.
//!
//! Clones share state, so a test can hand one handle to the orchestrator and
//! inspect the files through another.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use todo_types::TaskRecord;

use super::{partition, Store, StoreError};

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    initialized: bool,
    pending: Vec<TaskRecord>,
    archived: Vec<TaskRecord>,
    backlog: Vec<TaskRecord>,
    saves: usize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryStoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Contents of the pending "file".
    pub fn pending(&self) -> Vec<TaskRecord> {
        self.lock().pending.clone()
    }

    /// Contents of the archive "file".
    pub fn archived(&self) -> Vec<TaskRecord> {
        self.lock().archived.clone()
    }

    /// Contents of the change log.
    pub fn backlog(&self) -> Vec<TaskRecord> {
        self.lock().backlog.clone()
    }

    /// Number of completed `save` calls.
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn initialize(&self) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        let created = !inner.initialized;
        inner.initialized = true;
        Ok(created)
    }

    async fn load_pending(&self) -> Result<Vec<TaskRecord>, StoreError> {
        Ok(self.pending())
    }

    async fn load_archived(&self) -> Result<Vec<TaskRecord>, StoreError> {
        Ok(self.archived())
    }

    async fn load_backlog(&self) -> Result<Vec<TaskRecord>, StoreError> {
        Ok(self.backlog())
    }

    async fn append_backlog(&self, records: &[TaskRecord]) -> Result<(), StoreError> {
        self.lock().backlog.extend(records.iter().cloned());
        Ok(())
    }

    async fn delete_backlog(&self) -> Result<(), StoreError> {
        self.lock().backlog.clear();
        Ok(())
    }

    async fn save(&self, records: &[TaskRecord]) -> Result<(), StoreError> {
        let (pending, archived, modified) = partition(records);
        let strip = |mut records: Vec<TaskRecord>| {
            for r in &mut records {
                r.is_modified = false;
            }
            records
        };

        let mut inner = self.lock();
        inner.pending = strip(pending);
        inner.archived = strip(archived);
        inner.backlog.extend(strip(modified));
        inner.saves += 1;
        Ok(())
    }
}
