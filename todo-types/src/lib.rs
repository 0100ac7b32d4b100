//! # todo-types
//!
//! Record types shared by every todosync crate:
//! - [`TaskRecord`] and [`TaskStatus`] - the unit of data being synchronised
//! - [`TaskUuid`] - replica-stable identity
//! - [`timestamp`] - RFC 3339 helpers for created/modified dates
//! - [`RecordError`] - change-log line (de)serialisation errors

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ids;
mod task;
pub mod timestamp;

pub use error::RecordError;
pub use ids::TaskUuid;
pub use task::{TaskRecord, TaskStatus};
