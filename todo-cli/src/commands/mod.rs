//! CLI command implementations.

pub mod add;
pub mod edit;
pub mod init;
pub mod list;
pub mod sync;

use anyhow::{Context, Result};
use std::path::PathBuf;
use todo_client::{FileStore, Store};
use todo_core::TaskList;

use crate::config::Config;

/// Everything a command needs: where the replica lives and how it is configured.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Data directory.
    pub data_dir: PathBuf,
    /// Loaded configuration.
    pub config: Config,
}

impl Workspace {
    /// Create a workspace.
    pub fn new(data_dir: PathBuf, config: Config) -> Self {
        Self { data_dir, config }
    }

    /// The replica's file store.
    pub fn store(&self) -> FileStore {
        FileStore::new(self.config.store_paths(&self.data_dir))
    }

    /// Load pending and archived tasks.
    pub async fn load_list(&self) -> Result<TaskList> {
        let store = self.store();
        match store.load_list().await {
            Ok(list) => Ok(list),
            Err(e) if e.is_not_found() => {
                anyhow::bail!("No todo list in {}. Run 'todo init' first.", self.data_dir.display())
            }
            Err(e) => Err(e).context("Failed to load todos"),
        }
    }

    /// Persist `list` and append its modified records to the change log.
    pub async fn save_list(&self, list: &TaskList) -> Result<()> {
        self.store()
            .save(list.tasks())
            .await
            .context("Failed to save todos")
    }
}
