//! Configuration loading for the todo CLI.
//!
//! Configuration is read from a TOML file, `todo.toml` in the data directory
//! unless `--config` names another one. Every section is optional.
//!
//! ```toml
//! [files]
//! pending = "todos.json"
//! archived = "todos_archive.json"
//! backlog = "todos_backlog.json"
//!
//! [sync]
//! filepath = "/shared/todo_sync.json"
//! passphrase = "*"        # literal | "*" to prompt | "" for none
//! kdf = "argon2id"        # or "sha256" (weak)
//!
//! [priority]
//! order = ["H", "M", "L"]
//!
//! [report]
//! columns = ["id", "priority", "subject", "projects", "contexts", "due"]
//! sort = ["+priority", "+due", "+id"]
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use todo_client::{KdfKind, StorePaths};
use todo_core::{PriorityTable, Sorter};

use crate::report::{Column, Report};

/// Default configuration file name inside the data directory.
pub const CONFIG_FILE: &str = "todo.toml";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// File name overrides.
    pub files: FilesConfig,
    /// Sync settings.
    pub sync: SyncConfig,
    /// Priority ranking.
    pub priority: PriorityConfig,
    /// Default report.
    pub report: ReportConfig,
}

/// Replica file locations. Relative paths are resolved against the data directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilesConfig {
    /// Pending tasks file.
    pub pending: Option<PathBuf>,
    /// Archive file.
    pub archived: Option<PathBuf>,
    /// Local change log.
    pub backlog: Option<PathBuf>,
}

/// Key derivation named in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KdfSetting {
    /// Argon2id.
    #[default]
    Argon2id,
    /// Single SHA-256 pass (weak).
    Sha256,
}

impl From<KdfSetting> for KdfKind {
    fn from(setting: KdfSetting) -> Self {
        match setting {
            KdfSetting::Argon2id => KdfKind::Argon2id,
            KdfSetting::Sha256 => KdfKind::Sha256,
        }
    }
}

/// Sync settings.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Shared change log. Its directory must exist.
    pub filepath: Option<PathBuf>,
    /// Literal passphrase, `*` to prompt, empty for no encryption.
    pub passphrase: String,
    /// Key derivation for the passphrase.
    pub kdf: KdfSetting,
}

// Don't leak a literal passphrase in debug output
impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("filepath", &self.filepath)
            .field("passphrase", &self.passphrase_source())
            .field("kdf", &self.kdf)
            .finish()
    }
}

/// How the envelope passphrase is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassphraseSource {
    /// No encryption.
    None,
    /// Ask on the terminal, once per invocation.
    Prompt,
    /// Taken from the configuration file.
    Literal,
}

impl SyncConfig {
    /// Where the passphrase comes from.
    pub fn passphrase_source(&self) -> PassphraseSource {
        match self.passphrase.as_str() {
            "" => PassphraseSource::None,
            "*" => PassphraseSource::Prompt,
            _ => PassphraseSource::Literal,
        }
    }

    /// Shared change log path, resolved against `data_dir`. `None` if unset.
    pub fn remote_path(&self, data_dir: &Path) -> Option<PathBuf> {
        self.filepath
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| data_dir.join(p))
    }
}

/// Priority ranking.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PriorityConfig {
    /// Labels, most important first.
    pub order: Vec<String>,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            order: PriorityTable::default().labels().to_vec(),
        }
    }
}

/// Default report layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Column names, left to right.
    pub columns: Vec<String>,
    /// Sort keys such as `+due` or `-priority`.
    pub sort: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            columns: ["id", "priority", "subject", "projects", "contexts", "due"]
                .map(String::from)
                .to_vec(),
            sort: Sorter::default().keys().iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Like [`Config::from_file`], but a missing file yields the defaults.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::from_file(path) {
            Err(ConfigError::ReadError { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Replica file paths inside `data_dir`.
    pub fn store_paths(&self, data_dir: &Path) -> StorePaths {
        let defaults = StorePaths::in_dir(data_dir);
        let resolve = |custom: &Option<PathBuf>, default: PathBuf| {
            custom.as_ref().map(|p| data_dir.join(p)).unwrap_or(default)
        };
        StorePaths {
            pending: resolve(&self.files.pending, defaults.pending),
            archived: resolve(&self.files.archived, defaults.archived),
            backlog: resolve(&self.files.backlog, defaults.backlog),
        }
    }

    /// The configured priority ranking.
    pub fn priorities(&self) -> PriorityTable {
        PriorityTable::new(self.priority.order.iter().cloned())
    }

    /// Build the default report.
    pub fn report(&self) -> Result<Report, ConfigError> {
        let columns = self
            .report
            .columns
            .iter()
            .map(|c| c.parse::<Column>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let sorter = Sorter::parse(&self.report.sort, self.priorities())
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(Report::new(columns, sorter))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
    /// A value is well-formed TOML but not meaningful.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
