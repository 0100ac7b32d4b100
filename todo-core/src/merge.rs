//! Last-writer-wins merge of a remote delta into a local list.
//!
//! Conflicts are resolved at whole-record granularity: when both replicas
//! edited the same record, the version with the later modification time is
//! kept in full. Concurrent edits to different fields of one record are not
//! combined; the older edit is lost. This is a known limitation.

use chrono::{DateTime, Utc};
use todo_types::{timestamp, TaskRecord, TaskStatus};

use crate::list::TaskList;

/// What a merge did to the local list.
///
/// The three lists are disjoint. Each entry is the record as it stands after
/// the merge (for `deleted` entries that were never local, the remote copy).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Remote records inserted into the local list.
    pub added: Vec<TaskRecord>,
    /// Local records matched by a remote record (whichever side won).
    pub modified: Vec<TaskRecord>,
    /// Records that are deleted after the merge.
    pub deleted: Vec<TaskRecord>,
}

impl MergeReport {
    /// Whether the merge changed nothing.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }
}

/// Time used to order two versions of a record.
///
/// `modifiedDate` if it parses, else `createdDate`, else `now`.
pub fn effective_time(record: &TaskRecord, now: DateTime<Utc>) -> DateTime<Utc> {
    timestamp::parse(&record.modified_date)
        .or_else(|| timestamp::parse(&record.created_date))
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(now)
}

/// Elements of `a` that are not in `b`, in `a`'s order.
fn difference(a: &[String], b: &[String]) -> Vec<String> {
    a.iter().filter(|x| !b.contains(x)).cloned().collect()
}

/// Overwrite the local record at `index` with `remote`'s mutable fields.
///
/// Project and context membership goes through the list's add/remove
/// helpers so ordinal bookkeeping for those sets stays consistent.
fn take_remote(local: &mut TaskList, index: usize, remote: TaskRecord) {
    let Some(task) = local.get_mut(index) else {
        return;
    };
    task.subject = remote.subject;
    task.priority = remote.priority;
    task.modified_date = remote.modified_date;
    task.wait = remote.wait;
    task.until = remote.until;
    task.due = remote.due;
    task.completed = remote.completed;
    task.completed_date = remote.completed_date;
    task.status = remote.status;
    task.notes = remote.notes;

    let stale_projects = difference(&task.projects, &remote.projects);
    let new_projects = difference(&remote.projects, &task.projects);
    let stale_contexts = difference(&task.contexts, &remote.contexts);
    let new_contexts = difference(&remote.contexts, &task.contexts);

    for project in &stale_projects {
        local.remove_project(index, project);
    }
    for project in &new_projects {
        local.add_project(index, project);
    }
    for context in &stale_contexts {
        local.remove_context(index, context);
    }
    for context in &new_contexts {
        local.add_context(index, context);
    }

    if let Some(task) = local.get_mut(index) {
        task.ordinals = remote.ordinals;
    }
}

/// Merge `remote` (records written since the last checkpoint) into `local`.
///
/// For each remote record, checkpoint markers skipped:
/// - unknown uuid, status Deleted: reported as deleted, not inserted;
/// - unknown uuid otherwise: given the next display id, inserted, reported as added;
/// - known uuid: the remote version replaces the local one only if its
///   effective time is strictly later. The local record is then reported as
///   deleted or modified according to its resulting status.
pub fn merge(local: &mut TaskList, remote: &[TaskRecord], now: DateTime<Utc>) -> MergeReport {
    let mut report = MergeReport::default();

    for incoming in remote {
        if incoming.is_checkpoint() {
            continue;
        }
        let mut incoming = incoming.clone();

        let Some(index) = local.position_by_uuid(&incoming.uuid) else {
            if incoming.status == TaskStatus::Deleted {
                tracing::debug!(uuid = %incoming.uuid, "remote deletion of unknown record");
                report.deleted.push(incoming);
            } else {
                incoming.id = local.next_id();
                incoming.is_modified = false;
                tracing::debug!(uuid = %incoming.uuid, id = incoming.id, "adding remote record");
                local.push(incoming.clone());
                report.added.push(incoming);
            }
            continue;
        };

        let local_time = local
            .get(index)
            .map(|l| effective_time(l, now))
            .unwrap_or(now);
        let remote_time = effective_time(&incoming, now);
        if remote_time > local_time {
            tracing::debug!(uuid = %incoming.uuid, "remote version wins");
            take_remote(local, index, incoming);
        } else {
            tracing::debug!(uuid = %incoming.uuid, "local version wins");
        }

        if let Some(merged) = local.get(index) {
            if merged.status == TaskStatus::Deleted {
                report.deleted.push(merged.clone());
            } else {
                report.modified.push(merged.clone());
            }
        }
    }

    report
}
