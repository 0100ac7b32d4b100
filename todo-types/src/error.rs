//! Error types for task records.

use thiserror::Error;

/// Errors raised while converting a record to or from its change-log line.
#[derive(Debug, Error)]
pub enum RecordError {
    /// JSON serialization failed
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// JSON deserialization failed
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
}
