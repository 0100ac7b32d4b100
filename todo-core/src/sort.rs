//! Multi-key ordering of task records for reports.
//!
//! A [`Sorter`] holds an ordered list of [`SortKey`]s and the
//! [`PriorityTable`] used to rank priority labels. Keys are evaluated left to
//! right and the first one that tells two records apart decides.
//!
//! Empty values (no due date, no priority) always sort last, whichever
//! direction the key asks for.

use std::cmp::Ordering;
use std::str::FromStr;

use thiserror::Error;
use todo_types::{timestamp, TaskRecord, TaskStatus};

/// Errors from parsing sort keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortKeyError {
    /// Key was empty or only a direction sign.
    #[error("empty sort key")]
    Empty,

    /// Key named a field that cannot be sorted on.
    #[error("unknown sort field: {0}")]
    UnknownField(String),
}

/// Ranking of priority labels, most important first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityTable {
    order: Vec<String>,
}

impl PriorityTable {
    /// Create a table from labels listed most important first.
    pub fn new(order: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            order: order.into_iter().map(Into::into).collect(),
        }
    }

    /// Labels in rank order.
    pub fn labels(&self) -> &[String] {
        &self.order
    }

    /// Compare two priority labels.
    ///
    /// Known labels rank by table position, unknown labels after all known
    /// ones (alphabetically among themselves), empty labels last.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.rank(a).cmp(&self.rank(b))
    }

    fn rank<'a>(&self, label: &'a str) -> (u8, usize, &'a str) {
        if label.is_empty() {
            return (2, 0, label);
        }
        match self.order.iter().position(|p| p == label) {
            Some(pos) => (0, pos, label),
            None => (1, 0, label),
        }
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self::new(["H", "M", "L"])
    }
}

/// Record field a report can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// Display id.
    Id,
    /// Uuid.
    Uuid,
    /// Priority, ranked through the [`PriorityTable`].
    Priority,
    /// Subject text.
    Subject,
    /// Due date.
    Due,
    /// Wait date.
    Wait,
    /// Expiry date.
    Until,
    /// Creation date.
    Created,
    /// Last modification date.
    Modified,
    /// Done flag, open tasks first.
    Completed,
    /// Lifecycle status.
    Status,
}

impl SortField {
    /// Name used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Uuid => "uuid",
            SortField::Priority => "priority",
            SortField::Subject => "subject",
            SortField::Due => "due",
            SortField::Wait => "wait",
            SortField::Until => "until",
            SortField::Created => "created",
            SortField::Modified => "modified",
            SortField::Completed => "completed",
            SortField::Status => "status",
        }
    }
}

impl FromStr for SortField {
    type Err = SortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s {
            "id" => SortField::Id,
            "uuid" => SortField::Uuid,
            "priority" => SortField::Priority,
            "subject" => SortField::Subject,
            "due" => SortField::Due,
            "wait" => SortField::Wait,
            "until" => SortField::Until,
            "created" => SortField::Created,
            "modified" => SortField::Modified,
            "completed" => SortField::Completed,
            "status" => SortField::Status,
            "" => return Err(SortKeyError::Empty),
            other => return Err(SortKeyError::UnknownField(other.to_string())),
        };
        Ok(field)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl Direction {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

/// One sort criterion: a field and a direction.
///
/// Parsed from `+field` (ascending), `-field` (descending) or a bare `field`
/// (ascending).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    /// Field compared.
    pub field: SortField,
    /// Direction applied to non-empty values.
    pub direction: Direction,
}

impl SortKey {
    /// Ascending key on `field`.
    pub fn ascending(field: SortField) -> Self {
        Self {
            field,
            direction: Direction::Ascending,
        }
    }

    /// Descending key on `field`.
    pub fn descending(field: SortField) -> Self {
        Self {
            field,
            direction: Direction::Descending,
        }
    }
}

impl FromStr for SortKey {
    type Err = SortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (direction, name) = if let Some(rest) = s.strip_prefix('-') {
            (Direction::Descending, rest)
        } else if let Some(rest) = s.strip_prefix('+') {
            (Direction::Ascending, rest)
        } else {
            (Direction::Ascending, s)
        };
        Ok(Self {
            field: name.parse()?,
            direction,
        })
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = match self.direction {
            Direction::Ascending => '+',
            Direction::Descending => '-',
        };
        write!(f, "{sign}{}", self.field.name())
    }
}

/// Compare optional values with `None` last regardless of direction.
fn compare_present<T: Ord>(a: Option<T>, b: Option<T>, direction: Direction) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => direction.apply(a.cmp(&b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn status_rank(status: TaskStatus) -> u8 {
    match status {
        TaskStatus::Pending => 0,
        TaskStatus::Archived => 1,
        TaskStatus::Deleted => 2,
        TaskStatus::Checkpoint => 3,
    }
}

/// Orders records by a list of keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sorter {
    keys: Vec<SortKey>,
    priorities: PriorityTable,
}

impl Sorter {
    /// Create a sorter from keys and a priority table.
    pub fn new(keys: Vec<SortKey>, priorities: PriorityTable) -> Self {
        Self { keys, priorities }
    }

    /// Parse textual keys such as `+due` or `-priority`.
    pub fn parse<S: AsRef<str>>(keys: &[S], priorities: PriorityTable) -> Result<Self, SortKeyError> {
        let keys = keys
            .iter()
            .map(|k| k.as_ref().parse())
            .collect::<Result<Vec<SortKey>, _>>()?;
        Ok(Self::new(keys, priorities))
    }

    /// Keys in evaluation order.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Compare two records key by key; the first non-equal key decides.
    pub fn compare(&self, a: &TaskRecord, b: &TaskRecord) -> Ordering {
        self.keys
            .iter()
            .map(|key| self.compare_key(*key, a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    fn compare_key(&self, key: SortKey, a: &TaskRecord, b: &TaskRecord) -> Ordering {
        let dir = key.direction;
        let date = |value: &str| timestamp::parse(value);
        match key.field {
            SortField::Id => dir.apply(a.id.cmp(&b.id)),
            SortField::Uuid => dir.apply(a.uuid.cmp(&b.uuid)),
            SortField::Priority => match (a.priority.is_empty(), b.priority.is_empty()) {
                (false, false) => dir.apply(self.priorities.compare(&a.priority, &b.priority)),
                (empty_a, empty_b) => empty_a.cmp(&empty_b),
            },
            SortField::Subject => {
                dir.apply(a.subject.to_lowercase().cmp(&b.subject.to_lowercase()))
            }
            SortField::Due => compare_present(date(&a.due), date(&b.due), dir),
            SortField::Wait => compare_present(date(&a.wait), date(&b.wait), dir),
            SortField::Until => compare_present(date(&a.until), date(&b.until), dir),
            SortField::Created => {
                compare_present(date(&a.created_date), date(&b.created_date), dir)
            }
            SortField::Modified => {
                compare_present(date(&a.modified_date), date(&b.modified_date), dir)
            }
            SortField::Completed => dir.apply(a.completed.cmp(&b.completed)),
            SortField::Status => dir.apply(status_rank(a.status).cmp(&status_rank(b.status))),
        }
    }

    /// Stable-sort records in place.
    pub fn sort(&self, records: &mut [TaskRecord]) {
        records.sort_by(|a, b| self.compare(a, b));
    }

    /// Stable-sort borrowed records in place.
    pub fn sort_refs(&self, records: &mut [&TaskRecord]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

impl Default for Sorter {
    /// `+priority +due +id` over the default priority table.
    fn default() -> Self {
        Self::new(
            vec![
                SortKey::ascending(SortField::Priority),
                SortKey::ascending(SortField::Due),
                SortKey::ascending(SortField::Id),
            ],
            PriorityTable::default(),
        )
    }
}
