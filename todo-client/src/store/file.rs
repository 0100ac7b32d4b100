//! Filesystem-backed store.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use todo_types::TaskRecord;

use super::{partition, Store, StoreError};
use crate::backlog;
use crate::fs::atomic_write;

/// Default pending file name.
pub const PENDING_FILE: &str = "todos.json";
/// Default archive file name.
pub const ARCHIVED_FILE: &str = "todos_archive.json";
/// Default change log file name.
pub const BACKLOG_FILE: &str = "todos_backlog.json";

/// Paths of a replica's three files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    /// Pending tasks.
    pub pending: PathBuf,
    /// Archived tasks.
    pub archived: PathBuf,
    /// Local change log.
    pub backlog: PathBuf,
}

impl StorePaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            pending: dir.join(PENDING_FILE),
            archived: dir.join(ARCHIVED_FILE),
            backlog: dir.join(BACKLOG_FILE),
        }
    }
}

/// Store keeping tasks in JSON files.
#[derive(Debug, Clone)]
pub struct FileStore {
    paths: StorePaths,
}

impl FileStore {
    /// Create a store over explicit paths.
    pub fn new(paths: StorePaths) -> Self {
        Self { paths }
    }

    /// Create a store with default file names in `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(StorePaths::in_dir(dir))
    }

    /// The file paths.
    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    async fn read_array(path: &Path) -> Result<Vec<TaskRecord>, StoreError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    async fn write_array(path: &Path, records: &[TaskRecord]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(records).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        atomic_write(path, bytes)
            .await
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Create `path` with `contents` unless it exists.
    async fn create_if_missing(path: &Path, contents: &[u8]) -> Result<bool, StoreError> {
        let io_err = |source: io::Error| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
        {
            Ok(_) => {
                tokio::fs::write(path, contents).await.map_err(io_err)?;
                tracing::debug!(path = %path.display(), "created");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(io_err(e)),
        }
    }
}

#[async_trait]
impl Store for FileStore {
    async fn initialize(&self) -> Result<bool, StoreError> {
        let pending = Self::create_if_missing(&self.paths.pending, b"[]").await?;
        let archived = Self::create_if_missing(&self.paths.archived, b"[]").await?;
        let backlog = Self::create_if_missing(&self.paths.backlog, b"").await?;
        Ok(pending || archived || backlog)
    }

    async fn load_pending(&self) -> Result<Vec<TaskRecord>, StoreError> {
        Self::read_array(&self.paths.pending).await
    }

    async fn load_archived(&self) -> Result<Vec<TaskRecord>, StoreError> {
        Self::read_array(&self.paths.archived).await
    }

    async fn load_backlog(&self) -> Result<Vec<TaskRecord>, StoreError> {
        Ok(backlog::load_or_empty(&self.paths.backlog).await?)
    }

    async fn append_backlog(&self, records: &[TaskRecord]) -> Result<(), StoreError> {
        Ok(backlog::append(&self.paths.backlog, records).await?)
    }

    async fn delete_backlog(&self) -> Result<(), StoreError> {
        Ok(backlog::delete(&self.paths.backlog).await?)
    }

    async fn save(&self, records: &[TaskRecord]) -> Result<(), StoreError> {
        let (pending, archived, modified) = partition(records);
        tracing::debug!(
            pending = pending.len(),
            archived = archived.len(),
            modified = modified.len(),
            "saving"
        );

        tokio::try_join!(
            Self::write_array(&self.paths.pending, &pending),
            Self::write_array(&self.paths.archived, &archived),
            async {
                if modified.is_empty() {
                    Ok(())
                } else {
                    self.append_backlog(&modified).await
                }
            },
        )?;
        Ok(())
    }
}
