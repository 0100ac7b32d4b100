//! Replica harness: independent file-backed replicas sharing one change log.
//!
//! Every replica owns a temporary data directory with the usual pending,
//! archive and change-log files. A [`SharedLog`] stands in for the synced
//! folder all replicas point their `[sync] filepath` at.

use chrono::{DateTime, TimeZone, Utc};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;
use todo_client::backlog::{self, LogError};
use todo_client::{
    Argon2Params, Argon2idKdf, CryptoError, Envelope, FileStore, Store, StoreError, SyncError,
    SyncSummary, TodoSync,
};
use todo_types::{timestamp, TaskRecord, TaskStatus, TaskUuid};

use crate::assertions::ReplicaState;

/// Errors that can occur while driving replicas.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Local store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Sync run failed.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// Shared change log unreadable.
    #[error("log error: {0}")]
    Log(#[from] LogError),

    /// Envelope failure while inspecting the shared log.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Edit addressed a uuid the replica does not hold.
    #[error("replica {replica} has no task {uuid}")]
    UnknownTask {
        /// Replica name.
        replica: String,
        /// Missing uuid.
        uuid: TaskUuid,
    },

    /// General I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fixed scenario clock: `hour` o'clock UTC on the given day of March 2024.
pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Cheap Argon2id cost so scenario runs stay fast.
fn scenario_kdf() -> Argon2idKdf {
    Argon2idKdf::with_params(Argon2Params::new(1, 1, 1))
}

/// Derive the envelope a replica configured with `passphrase` would use.
pub fn envelope(passphrase: &str) -> Result<Envelope, HarnessError> {
    Ok(Envelope::from_passphrase(passphrase, &scenario_kdf())?)
}

/// The shared remote change log, optionally sealed.
pub struct SharedLog {
    _dir: TempDir,
    path: PathBuf,
    envelope: Option<Envelope>,
}

impl SharedLog {
    /// A plaintext shared log in a fresh directory. The file itself does not exist yet.
    pub fn new() -> Result<Self, HarnessError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("todo_sync.json");
        Ok(Self {
            _dir: dir,
            path,
            envelope: None,
        })
    }

    /// A shared log sealed under `passphrase`.
    pub fn encrypted(passphrase: &str) -> Result<Self, HarnessError> {
        let mut shared = Self::new()?;
        shared.envelope = Some(envelope(passphrase)?);
        Ok(shared)
    }

    /// Path replicas sync against.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw bytes as they sit in the shared folder (empty if never written).
    pub async fn raw(&self) -> Result<Vec<u8>, HarnessError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Decoded records, opening the envelope if there is one.
    pub async fn records(&self) -> Result<Vec<TaskRecord>, HarnessError> {
        let raw = self.raw().await?;
        let plain = match (&self.envelope, raw.is_empty()) {
            (Some(envelope), false) => envelope.open(&raw)?,
            _ => raw,
        };
        Ok(backlog::parse(&self.path, &plain)?)
    }

    /// Replace the plaintext log wholesale, as another tool rewriting the folder would.
    pub async fn overwrite(&self, records: &[TaskRecord]) -> Result<(), HarnessError> {
        Ok(backlog::rewrite(&self.path, records).await?)
    }
}

/// One replica: a named data directory with a [`FileStore`].
pub struct Replica {
    name: String,
    _dir: TempDir,
    store: FileStore,
}

impl Replica {
    /// Create and initialise a replica.
    pub async fn new(name: &str) -> Result<Self, HarnessError> {
        let dir = tempfile::tempdir()?;
        let store = FileStore::in_dir(dir.path());
        store.initialize().await?;
        tracing::debug!(replica = name, dir = %dir.path().display(), "replica initialised");
        Ok(Self {
            name: name.to_string(),
            _dir: dir,
            store,
        })
    }

    /// Replica name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying store.
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Add a todo stamped `when`. Returns its uuid.
    pub async fn add(&self, subject: &str, when: DateTime<Utc>) -> Result<TaskUuid, HarnessError> {
        let mut list = self.store.load_list().await?;
        let record = TaskRecord::with_subject(subject);
        let uuid = record.uuid;
        list.add(record, &timestamp::format(when));
        self.store.save(list.tasks()).await?;
        Ok(uuid)
    }

    /// Apply `change` to the task `uuid` and stamp it `when`.
    pub async fn edit(
        &self,
        uuid: TaskUuid,
        when: DateTime<Utc>,
        change: impl FnOnce(&mut TaskRecord),
    ) -> Result<(), HarnessError> {
        let mut list = self.store.load_list().await?;
        let task = list
            .position_by_uuid(&uuid)
            .and_then(|index| list.get_mut(index))
            .ok_or_else(|| HarnessError::UnknownTask {
                replica: self.name.clone(),
                uuid,
            })?;
        change(task);
        task.touch(&timestamp::format(when));
        self.store.save(list.tasks()).await?;
        Ok(())
    }

    /// Delete the task `uuid` at `when`.
    pub async fn delete(&self, uuid: TaskUuid, when: DateTime<Utc>) -> Result<(), HarnessError> {
        self.edit(uuid, when, |t| t.status = TaskStatus::Deleted).await
    }

    /// Sync against `shared` with its own envelope, at `when`.
    pub async fn sync(
        &self,
        shared: &SharedLog,
        when: DateTime<Utc>,
    ) -> Result<SyncSummary, HarnessError> {
        self.sync_with(shared, shared.envelope.clone(), when).await
    }

    /// Sync against `shared` using an explicit (possibly wrong) envelope.
    pub async fn sync_with(
        &self,
        shared: &SharedLog,
        envelope: Option<Envelope>,
        when: DateTime<Utc>,
    ) -> Result<SyncSummary, HarnessError> {
        let mut sync = TodoSync::new(self.store.clone(), Some(shared.path().to_path_buf()));
        if let Some(envelope) = envelope {
            sync = sync.with_envelope(envelope);
        }
        let summary = sync.sync_at(when).await?;
        tracing::debug!(replica = %self.name, uploaded = summary.uploaded, "replica synced");
        Ok(summary)
    }

    /// Todos in the local files (no checkpoints), by display id.
    pub async fn tasks(&self) -> Result<Vec<TaskRecord>, HarnessError> {
        let mut tasks: Vec<_> = self
            .store
            .load_list()
            .await?
            .into_records()
            .into_iter()
            .filter(|t| !t.is_checkpoint())
            .collect();
        tasks.sort_by_key(|t| t.id);
        Ok(tasks)
    }

    /// The local change log.
    pub async fn backlog(&self) -> Result<Vec<TaskRecord>, HarnessError> {
        Ok(self.store.load_backlog().await?)
    }

    /// Snapshot for the assertion helpers.
    pub async fn state(&self) -> Result<ReplicaState, HarnessError> {
        Ok(ReplicaState {
            name: self.name.clone(),
            tasks: self.tasks().await?,
        })
    }
}

/// Snapshot every replica in order.
pub async fn states(replicas: &[&Replica]) -> Result<Vec<ReplicaState>, HarnessError> {
    let mut out = Vec::with_capacity(replicas.len());
    for replica in replicas {
        out.push(replica.state().await?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replicas_are_isolated() {
        let a = Replica::new("a").await.unwrap();
        let b = Replica::new("b").await.unwrap();

        a.add("only on a", at(1, 9)).await.unwrap();
        assert_eq!(a.tasks().await.unwrap().len(), 1);
        assert!(b.tasks().await.unwrap().is_empty());
        assert_eq!(a.backlog().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn edit_unknown_uuid_fails() {
        let a = Replica::new("a").await.unwrap();
        let result = a.edit(TaskUuid::new(), at(1, 9), |_| {}).await;
        assert!(matches!(result, Err(HarnessError::UnknownTask { .. })));
    }

    #[tokio::test]
    async fn shared_log_starts_empty() {
        let shared = SharedLog::encrypted("pw").unwrap();
        assert!(shared.raw().await.unwrap().is_empty());
        assert!(shared.records().await.unwrap().is_empty());
    }
}
