//! Column-based task reports.

use std::str::FromStr;

use todo_core::Sorter;
use todo_types::{timestamp, TaskRecord};

/// A report column: a header plus how to render one record's cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Display id.
    Id,
    /// Uuid.
    Uuid,
    /// Priority label.
    Priority,
    /// Subject text.
    Subject,
    /// Projects, each prefixed with `+`.
    Projects,
    /// Contexts, each prefixed with `@`.
    Contexts,
    /// Due date.
    Due,
    /// Wait date.
    Wait,
    /// Expiry date.
    Until,
    /// Lifecycle status.
    Status,
    /// Done marker.
    Completed,
    /// Last modification date.
    Modified,
    /// Number of notes.
    Notes,
}

/// Column name not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown report column: {0}")]
pub struct UnknownColumn(pub String);

impl FromStr for Column {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "id" => Column::Id,
            "uuid" => Column::Uuid,
            "priority" => Column::Priority,
            "subject" => Column::Subject,
            "projects" => Column::Projects,
            "contexts" => Column::Contexts,
            "due" => Column::Due,
            "wait" => Column::Wait,
            "until" => Column::Until,
            "status" => Column::Status,
            "completed" => Column::Completed,
            "modified" => Column::Modified,
            "notes" => Column::Notes,
            other => return Err(UnknownColumn(other.to_string())),
        })
    }
}

/// Show the date part of a stored timestamp, or the raw value if it does not parse.
fn date(value: &str) -> String {
    match timestamp::parse(value) {
        Some(time) => time.format("%Y-%m-%d").to_string(),
        None => value.to_string(),
    }
}

fn tagged(prefix: char, values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("{prefix}{v}"))
        .collect::<Vec<_>>()
        .join(" ")
}

impl Column {
    /// Header text.
    pub fn header(self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::Uuid => "UUID",
            Column::Priority => "PRI",
            Column::Subject => "SUBJECT",
            Column::Projects => "PROJECTS",
            Column::Contexts => "CONTEXTS",
            Column::Due => "DUE",
            Column::Wait => "WAIT",
            Column::Until => "UNTIL",
            Column::Status => "STATUS",
            Column::Completed => "DONE",
            Column::Modified => "MODIFIED",
            Column::Notes => "NOTES",
        }
    }

    /// Cell text for `task`.
    pub fn value(self, task: &TaskRecord) -> String {
        match self {
            Column::Id => task.id.to_string(),
            Column::Uuid => task.uuid.to_string(),
            Column::Priority => task.priority.clone(),
            Column::Subject => task.subject.clone(),
            Column::Projects => tagged('+', &task.projects),
            Column::Contexts => tagged('@', &task.contexts),
            Column::Due => date(&task.due),
            Column::Wait => date(&task.wait),
            Column::Until => date(&task.until),
            Column::Status => task.status.to_string(),
            Column::Completed => if task.completed { "x" } else { "" }.to_string(),
            Column::Modified => date(&task.modified_date),
            Column::Notes => match task.notes.len() {
                0 => String::new(),
                n => n.to_string(),
            },
        }
    }
}

/// An ordered set of columns plus a sort order.
#[derive(Debug, Clone)]
pub struct Report {
    columns: Vec<Column>,
    sorter: Sorter,
}

impl Report {
    /// Create a report.
    pub fn new(columns: Vec<Column>, sorter: Sorter) -> Self {
        Self { columns, sorter }
    }

    /// Columns, left to right.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Render `tasks` as an aligned table with a header row.
    ///
    /// Returns an empty string when there is nothing to show.
    pub fn render(&self, tasks: &[TaskRecord]) -> String {
        if tasks.is_empty() || self.columns.is_empty() {
            return String::new();
        }

        let mut sorted: Vec<&TaskRecord> = tasks.iter().collect();
        self.sorter.sort_refs(&mut sorted);

        let header: Vec<String> = self.columns.iter().map(|c| c.header().to_string()).collect();
        let rows: Vec<Vec<String>> = sorted
            .iter()
            .map(|task| self.columns.iter().map(|c| c.value(task)).collect())
            .collect();

        let widths: Vec<usize> = (0..self.columns.len())
            .map(|i| {
                std::iter::once(&header)
                    .chain(rows.iter())
                    .map(|row| row[i].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        for row in std::iter::once(&header).chain(rows.iter()) {
            let line = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ");
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}
