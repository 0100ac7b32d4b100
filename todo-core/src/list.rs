//! The in-memory task collection.
//!
//! A [`TaskList`] owns the records of one replica (pending + archived, plus
//! any transiently deleted ones) and keeps two kinds of derived bookkeeping
//! consistent:
//! - display ids, unique within the list and re-derivable from uuid order
//! - ordinals, the position of each record within a `+project` / `@context` set
//!
//! Every mutating helper that represents a user edit stamps the record via
//! [`TaskRecord::touch`] so it reaches the change log on the next save.

use std::collections::HashSet;
use todo_types::{TaskRecord, TaskStatus, TaskUuid};

/// Ordering-set name for a project.
fn project_set(project: &str) -> String {
    format!("+{project}")
}

/// Ordering-set name for a context.
fn context_set(context: &str) -> String {
    format!("@{context}")
}

/// A replica's working collection of task records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<TaskRecord>,
}

impl TaskList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list holding `records` as loaded.
    pub fn from_records(records: Vec<TaskRecord>) -> Self {
        Self { tasks: records }
    }

    /// Append already-persisted records without touching them.
    pub fn load(&mut self, records: impl IntoIterator<Item = TaskRecord>) {
        self.tasks.extend(records);
    }

    /// All records in storage order.
    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    /// Consume the list, returning its records.
    pub fn into_records(self) -> Vec<TaskRecord> {
        self.tasks
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Record at `index`.
    pub fn get(&self, index: usize) -> Option<&TaskRecord> {
        self.tasks.get(index)
    }

    /// Mutable record at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut TaskRecord> {
        self.tasks.get_mut(index)
    }

    /// Insert a record as-is and return its index.
    pub fn push(&mut self, record: TaskRecord) -> usize {
        self.tasks.push(record);
        self.tasks.len() - 1
    }

    /// Add a new local task: assigns the next display id, stamps created and
    /// modified dates with `now`, and queues it for the change log.
    ///
    /// Returns the index of the inserted record.
    pub fn add(&mut self, mut record: TaskRecord, now: &str) -> usize {
        record.id = self.next_id();
        record.created_date = now.to_string();
        record.touch(now);
        self.push(record)
    }

    /// Highest display id in use, 0 when empty.
    pub fn max_id(&self) -> u32 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0)
    }

    /// Lowest positive display id not currently in use.
    pub fn next_id(&self) -> u32 {
        let used: HashSet<u32> = self.tasks.iter().map(|t| t.id).collect();
        (1..)
            .find(|id| !used.contains(id))
            .unwrap_or_else(|| self.max_id().saturating_add(1))
    }

    /// Find a record by display id.
    pub fn find_by_id(&self, id: u32) -> Option<&TaskRecord> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Index of the record with display id `id`.
    pub fn position_by_id(&self, id: u32) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Index of the record with `uuid`.
    pub fn position_by_uuid(&self, uuid: &TaskUuid) -> Option<usize> {
        self.tasks.iter().position(|t| &t.uuid == uuid)
    }

    /// Highest ordinal recorded for `set` among its members, skipping `skip`.
    ///
    /// Returns -1 when no other member carries an ordinal for the set.
    fn max_ordinal(&self, set: &str, skip: usize) -> i64 {
        let is_member = |task: &TaskRecord| {
            if let Some(project) = set.strip_prefix('+') {
                task.has_project(project)
            } else if let Some(context) = set.strip_prefix('@') {
                task.has_context(context)
            } else {
                true
            }
        };
        self.tasks
            .iter()
            .enumerate()
            .filter(|(i, task)| *i != skip && is_member(task))
            .filter_map(|(_, task)| task.ordinals.get(set).copied())
            .max()
            .unwrap_or(-1)
    }

    /// Place the record at `index` last in ordering set `set`.
    fn add_ordinal(&mut self, index: usize, set: String) {
        let next = self.max_ordinal(&set, index) + 1;
        if let Some(task) = self.tasks.get_mut(index) {
            task.ordinals.insert(set, next);
        }
    }

    /// Add `project` to the record at `index` and give it the last ordinal
    /// in that project's set. No-op if already a member.
    pub fn add_project(&mut self, index: usize, project: &str) {
        match self.tasks.get_mut(index) {
            Some(task) if !task.has_project(project) => task.projects.push(project.to_string()),
            _ => return,
        }
        self.add_ordinal(index, project_set(project));
    }

    /// Add `context` to the record at `index` and give it the last ordinal
    /// in that context's set. No-op if already a member.
    pub fn add_context(&mut self, index: usize, context: &str) {
        match self.tasks.get_mut(index) {
            Some(task) if !task.has_context(context) => task.contexts.push(context.to_string()),
            _ => return,
        }
        self.add_ordinal(index, context_set(context));
    }

    /// Remove `project` from the record at `index` along with its ordinal.
    pub fn remove_project(&mut self, index: usize, project: &str) {
        if let Some(task) = self.tasks.get_mut(index) {
            if let Some(pos) = task.projects.iter().position(|p| p == project) {
                task.projects.remove(pos);
                task.ordinals.remove(&project_set(project));
            }
        }
    }

    /// Remove `context` from the record at `index` along with its ordinal.
    pub fn remove_context(&mut self, index: usize, context: &str) {
        if let Some(task) = self.tasks.get_mut(index) {
            if let Some(pos) = task.contexts.iter().position(|c| c == context) {
                task.contexts.remove(pos);
                task.ordinals.remove(&context_set(context));
            }
        }
    }

    /// Apply `edit` to each record named by `ids`, touching it with `now`.
    ///
    /// Returns the ids that matched no record.
    fn edit_each(&mut self, ids: &[u32], now: &str, edit: impl Fn(&mut TaskRecord)) -> Vec<u32> {
        let mut missing = Vec::new();
        for &id in ids {
            match self.tasks.iter_mut().find(|t| t.id == id) {
                Some(task) => {
                    edit(task);
                    task.touch(now);
                }
                None => missing.push(id),
            }
        }
        missing
    }

    /// Mark tasks done.
    pub fn complete(&mut self, ids: &[u32], now: &str) -> Vec<u32> {
        self.edit_each(ids, now, |t| t.complete(now))
    }

    /// Clear the done flag on tasks.
    pub fn uncomplete(&mut self, ids: &[u32], now: &str) -> Vec<u32> {
        self.edit_each(ids, now, TaskRecord::uncomplete)
    }

    /// Move tasks to the archive.
    pub fn archive(&mut self, ids: &[u32], now: &str) -> Vec<u32> {
        self.edit_each(ids, now, TaskRecord::archive)
    }

    /// Move tasks back to pending.
    pub fn unarchive(&mut self, ids: &[u32], now: &str) -> Vec<u32> {
        self.edit_each(ids, now, TaskRecord::unarchive)
    }

    /// Mark tasks deleted. They stay in the list until the next save, which
    /// drops them from the pending/archive files but records them in the
    /// change log.
    pub fn delete(&mut self, ids: &[u32], now: &str) -> Vec<u32> {
        self.edit_each(ids, now, |t| t.status = TaskStatus::Deleted)
    }

    /// Take out every record whose status is Deleted.
    pub fn remove_deleted(&mut self) -> Vec<TaskRecord> {
        let (deleted, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|t| t.status == TaskStatus::Deleted);
        self.tasks = kept;
        deleted
    }

    /// Renumber every record 1..=n in uuid order.
    ///
    /// Two replicas holding the same uuid set end up with identical display ids.
    pub fn reassign_all_ids(&mut self) {
        self.tasks.sort_by(|a, b| a.uuid.cmp(&b.uuid));
        for (i, task) in self.tasks.iter_mut().enumerate() {
            task.id = (i + 1) as u32;
        }
    }

    /// Clear the change-log flag on every record.
    pub fn clear_modified(&mut self) {
        for task in &mut self.tasks {
            task.is_modified = false;
        }
    }

    /// Records queued for the change log.
    pub fn modified(&self) -> impl Iterator<Item = &TaskRecord> {
        self.tasks.iter().filter(|t| t.is_modified)
    }
}
