//! Change log (backlog) files.
//!
//! A change log is newline-delimited JSON: one [`TaskRecord`] snapshot per
//! line, in write order. Local logs are append-only between syncs; the shared
//! remote log is additionally rewritten when checkpoints rotate.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use todo_types::{RecordError, TaskRecord};
use tokio::io::AsyncWriteExt;

use crate::fs::atomic_write;

/// Change log errors.
#[derive(Debug, Error)]
pub enum LogError {
    /// Reading or writing the log failed.
    #[error("change log {path}: {source}")]
    Io {
        /// Log path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A line could not be decoded.
    #[error("change log {path} is corrupt at line {line}: {source}")]
    Corrupt {
        /// Log path.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Decode error.
        #[source]
        source: RecordError,
    },

    /// A record could not be encoded.
    #[error("cannot encode record for {path}: {source}")]
    Encode {
        /// Log path.
        path: PathBuf,
        /// Encode error.
        #[source]
        source: RecordError,
    },
}

impl LogError {
    /// Whether this is an I/O error for a file that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LogError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }

    fn io(path: &Path, source: io::Error) -> Self {
        LogError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn encode(path: &Path, records: &[TaskRecord]) -> Result<Vec<u8>, LogError> {
    let mut out = Vec::new();
    for record in records {
        let line = record.to_json_line().map_err(|source| LogError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        out.extend_from_slice(line.as_bytes());
        out.push(b'\n');
    }
    Ok(out)
}

/// Append `records` in order, creating the file if needed.
///
/// The data is flushed and synced to disk before returning.
pub async fn append(path: &Path, records: &[TaskRecord]) -> Result<(), LogError> {
    let bytes = encode(path, records)?;
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| LogError::io(path, e))?;
    file.write_all(&bytes)
        .await
        .map_err(|e| LogError::io(path, e))?;
    file.flush().await.map_err(|e| LogError::io(path, e))?;
    file.sync_all().await.map_err(|e| LogError::io(path, e))?;
    tracing::debug!(path = %path.display(), count = records.len(), "appended to change log");
    Ok(())
}

/// Decode a change log from its bytes. Blank lines are skipped.
///
/// Any undecodable line, including one that is not valid UTF-8, fails the
/// whole log.
pub fn parse(path: &Path, bytes: &[u8]) -> Result<Vec<TaskRecord>, LogError> {
    bytes
        .split(|b| *b == b'\n')
        .enumerate()
        .filter(|(_, line)| !line.iter().all(u8::is_ascii_whitespace))
        .map(|(i, line)| {
            TaskRecord::from_json_slice(line).map_err(|source| LogError::Corrupt {
                path: path.to_path_buf(),
                line: i + 1,
                source,
            })
        })
        .collect()
}

/// Load every record in the log.
///
/// A missing file is an [`LogError::Io`] with kind `NotFound`.
pub async fn load(path: &Path) -> Result<Vec<TaskRecord>, LogError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| LogError::io(path, e))?;
    parse(path, &bytes)
}

/// Like [`load`], but a missing file is an empty log. Any other failure,
/// including a corrupt line, is still an error.
pub async fn load_or_empty(path: &Path) -> Result<Vec<TaskRecord>, LogError> {
    match load(path).await {
        Err(e) if e.is_not_found() => Ok(Vec::new()),
        other => other,
    }
}

/// Remove the log. Removing a missing log succeeds.
pub async fn delete(path: &Path) -> Result<(), LogError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LogError::io(path, e)),
    }
}

/// Replace the log contents with `records`, atomically.
pub async fn rewrite(path: &Path, records: &[TaskRecord]) -> Result<(), LogError> {
    let bytes = encode(path, records)?;
    atomic_write(path, bytes)
        .await
        .map_err(|e| LogError::io(path, e))?;
    tracing::debug!(path = %path.display(), count = records.len(), "rewrote change log");
    Ok(())
}
