//! Small filesystem helpers shared by the stores.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Replace `path` with `contents` atomically.
///
/// The bytes go to a temporary file in the same directory, are synced, then
/// renamed over `path`. Readers see either the old or the new file. An
/// existing file keeps its permissions.
pub async fn atomic_write(path: &Path, contents: Vec<u8>) -> io::Result<()> {
    let path: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&contents)?;
        if let Ok(existing) = std::fs::metadata(&path) {
            tmp.as_file().set_permissions(existing.permissions())?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}

/// Read a file, treating a missing file as empty.
pub async fn read_or_empty(path: &Path) -> io::Result<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}
