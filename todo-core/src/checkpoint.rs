//! Checkpoint protocol for change logs.
//!
//! A checkpoint is a [`TaskRecord`] with status `Checkpoint`. It marks the
//! position up to which a replica has already merged the shared (remote) log:
//! - the local log starts with the current checkpoint, followed by local
//!   edits made since (the "uploads");
//! - the remote log holds, at most, one live checkpoint per replica.
//!
//! On every sync the replica appends a fresh checkpoint to the remote log and
//! prunes its previous one, so the next delta starts right after the new mark.

use std::collections::HashMap;
use todo_types::{TaskRecord, TaskUuid};

/// A local change log split into its checkpoint and pending uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacklogSplit {
    /// Current checkpoint, or a blank one before the first sync.
    pub checkpoint: TaskRecord,
    /// Local edits made since the checkpoint, in log order.
    pub uploads: Vec<TaskRecord>,
    /// Whether the checkpoint was read from the log rather than synthesised.
    pub had_checkpoint: bool,
}

/// Split a local change log.
///
/// If the first entry is a checkpoint it is the current one and the rest are
/// uploads. Otherwise this replica has never synced: a blank checkpoint (fresh
/// uuid, empty modified date) is synthesised and every entry is an upload.
pub fn split_backlog(mut backlog: Vec<TaskRecord>) -> BacklogSplit {
    if backlog.first().is_some_and(TaskRecord::is_checkpoint) {
        let checkpoint = backlog.remove(0);
        BacklogSplit {
            checkpoint,
            uploads: backlog,
            had_checkpoint: true,
        }
    } else {
        BacklogSplit {
            checkpoint: TaskRecord::checkpoint(""),
            uploads: backlog,
            had_checkpoint: false,
        }
    }
}

/// Entries of `remote` strictly after the position of `checkpoint`.
///
/// A blank checkpoint, or one whose uuid is absent from `remote`, yields the
/// whole log: either this is the first sync or the logs have diverged and
/// re-merging everything is the safe choice.
pub fn delta_since(mut remote: Vec<TaskRecord>, checkpoint: &TaskRecord) -> Vec<TaskRecord> {
    if checkpoint.modified_date.is_empty() {
        return remote;
    }
    match remote.iter().position(|r| r.uuid == checkpoint.uuid) {
        Some(pos) => remote.split_off(pos + 1),
        None => remote,
    }
}

/// Drop superseded writes: for every uuid only its last occurrence survives.
///
/// Survivors keep the relative order of their last occurrences.
pub fn consolidate(records: Vec<TaskRecord>) -> Vec<TaskRecord> {
    let last: HashMap<TaskUuid, usize> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (r.uuid, i))
        .collect();
    records
        .into_iter()
        .enumerate()
        .filter(|(i, r)| last.get(&r.uuid) == Some(i))
        .map(|(_, r)| r)
        .collect()
}

/// Drop every entry carrying `uuid`.
pub fn prune(records: Vec<TaskRecord>, uuid: &TaskUuid) -> Vec<TaskRecord> {
    records.into_iter().filter(|r| &r.uuid != uuid).collect()
}

/// Consolidate a remote log and remove the `previous` checkpoint from it.
pub fn rotate(records: Vec<TaskRecord>, previous: &TaskRecord) -> Vec<TaskRecord> {
    prune(consolidate(records), &previous.uuid)
}
