//! # todo-core
//!
//! Pure logic for todosync (no I/O, instant tests).
//!
//! This crate implements the algorithms behind replica synchronisation
//! without touching the filesystem:
//! - [`TaskList`] - the in-memory collection and its bookkeeping (display ids, ordinals)
//! - [`checkpoint`] - locating the delta after the last synchronised position
//! - [`merge()`] - last-writer-wins reconciliation of a remote delta
//! - [`Sorter`] - multi-key ordering for reports
//!
//! ## Design Philosophy
//!
//! Every function takes its inputs by value or reference and returns its
//! result; the clock is passed in. The file and crypto work is done by
//! `todo-client`, which feeds these functions and persists what they return.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checkpoint;
pub mod list;
pub mod merge;
pub mod sort;

pub use checkpoint::{consolidate, delta_since, prune, rotate, split_backlog, BacklogSplit};
pub use list::TaskList;
pub use merge::{effective_time, merge, MergeReport};
pub use sort::{Direction, PriorityTable, SortField, SortKey, SortKeyError, Sorter};
