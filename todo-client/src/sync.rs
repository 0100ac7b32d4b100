//! TodoSync - the replica synchronisation orchestrator.
//!
//! # Architecture
//!
//! The orchestrator drives the pure algorithms from `todo-core` and performs
//! the I/O around them through a [`Store`] (local files) and a shared remote
//! change log, optionally sealed by an [`Envelope`].
//!
//! ```text
//! Store ──load──> TaskList ──merge(delta)──> TaskList ──save──> Store
//!                     ^                          |
//!          remote log (decrypted working copy) <-┘ uploads + checkpoint
//! ```
//!
//! # Ordering
//!
//! The remote log is only written after the in-memory merge succeeded, and
//! local files are only finalised after the remote log is written. A failed
//! run leaves the local change log in place, so re-running is safe: the
//! merge is idempotent and the uploads are simply sent again.
//!
//! Two replicas syncing against the same remote path at the same moment is
//! not guarded against.
//!
//! # Example
//!
//! ```ignore
//! use todo_client::{FileStore, TodoSync};
//!
//! let store = FileStore::in_dir(&data_dir);
//! let sync = TodoSync::new(store, Some(remote_path));
//! let summary = sync.sync().await?;
//! println!("Uploaded {}", summary.uploaded);
//! ```

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use thiserror::Error;
use todo_core::{delta_since, merge, rotate, split_backlog};
use todo_types::{timestamp, TaskRecord};

use crate::backlog::{self, LogError};
use crate::crypto::{CryptoError, Envelope};
use crate::store::{Store, StoreError};

/// Sync errors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No remote change log path is configured.
    #[error("no sync file configured (set [sync] filepath)")]
    NoRemotePath,

    /// Change log unreadable, corrupt or unwritable.
    #[error(transparent)]
    Log(#[from] LogError),

    /// Envelope key derivation, encryption or decryption failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Local store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Other I/O (temporary working copy).
    #[error("sync I/O: {0}")]
    Io(#[from] io::Error),
}

/// Outcome of one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Local change-log entries written to the remote log.
    pub uploaded: usize,
    /// Remote records inserted locally.
    pub added: Vec<TaskRecord>,
    /// Local records matched by a remote record.
    pub modified: Vec<TaskRecord>,
    /// Records deleted after the merge.
    pub deleted: Vec<TaskRecord>,
}

/// The remote log as the orchestrator works on it.
enum WorkingLog<'a> {
    /// No envelope: the remote path itself.
    Direct(&'a Path),
    /// Envelope: a private decrypted copy, removed on drop.
    Decrypted(NamedTempFile),
}

impl WorkingLog<'_> {
    fn path(&self) -> &Path {
        match self {
            WorkingLog::Direct(path) => path,
            WorkingLog::Decrypted(file) => file.path(),
        }
    }
}

/// Synchronises one replica's store with a shared remote change log.
pub struct TodoSync<S: Store> {
    store: S,
    remote: Option<PathBuf>,
    envelope: Option<Envelope>,
    work_dir: Option<PathBuf>,
}

impl<S: Store> TodoSync<S> {
    /// Create an orchestrator. `remote` is the shared change log path.
    pub fn new(store: S, remote: Option<PathBuf>) -> Self {
        Self {
            store,
            remote,
            envelope: None,
            work_dir: None,
        }
    }

    /// Seal the remote log with `envelope`.
    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = Some(envelope);
        self
    }

    /// Keep the decrypted working copy in `dir` instead of the system temp dir.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// The local store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one sync at the current time.
    pub async fn sync(&self) -> Result<SyncSummary, SyncError> {
        self.sync_at(Utc::now()).await
    }

    /// Run one sync, stamping the new checkpoint with `now`.
    pub async fn sync_at(&self, now: DateTime<Utc>) -> Result<SyncSummary, SyncError> {
        let remote = self.remote.as_deref().ok_or(SyncError::NoRemotePath)?;

        let working = match &self.envelope {
            Some(envelope) => {
                let file = match &self.work_dir {
                    Some(dir) => NamedTempFile::new_in(dir)?,
                    None => NamedTempFile::new()?,
                };
                envelope.decrypt_file(remote, file.path()).await?;
                tracing::debug!(remote = %remote.display(), "decrypted remote log");
                WorkingLog::Decrypted(file)
            }
            None => WorkingLog::Direct(remote),
        };

        let mut local = self.store.load_list().await?;
        tracing::debug!(records = local.len(), "loaded local records");

        let split = split_backlog(self.store.load_backlog().await?);
        let uploaded = split.uploads.len();
        tracing::debug!(
            uploads = uploaded,
            had_checkpoint = split.had_checkpoint,
            "split local change log"
        );

        let remote_log = backlog::load_or_empty(working.path()).await?;
        let delta = delta_since(remote_log, &split.checkpoint);
        tracing::debug!(delta = delta.len(), "extracted remote delta");

        let report = merge(&mut local, &delta, now);

        let mut checkpoint = TaskRecord::checkpoint(timestamp::format(now));
        let mut outgoing = split.uploads;
        outgoing.push(checkpoint.clone());
        backlog::append(working.path(), &outgoing).await?;
        let written = backlog::load(working.path()).await?;
        backlog::rewrite(working.path(), &rotate(written, &split.checkpoint)).await?;
        tracing::debug!(checkpoint = %checkpoint.uuid, "rotated checkpoint");

        if let (Some(envelope), WorkingLog::Decrypted(file)) = (&self.envelope, &working) {
            envelope.encrypt_file(file.path(), remote).await?;
            tracing::debug!(remote = %remote.display(), "encrypted remote log");
        }
        drop(working);

        self.store.delete_backlog().await?;
        local.clear_modified();
        local.remove_deleted();
        local.reassign_all_ids();
        let mut records = local.into_records();
        checkpoint.is_modified = true;
        records.push(checkpoint);
        self.store.save(&records).await?;

        tracing::info!(
            uploaded,
            added = report.added.len(),
            modified = report.modified.len(),
            deleted = report.deleted.len(),
            "sync completed"
        );

        Ok(SyncSummary {
            uploaded,
            added: report.added,
            modified: report.modified,
            deleted: report.deleted,
        })
    }
}
