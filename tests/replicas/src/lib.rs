//! # replica-tests
//!
//! Multi-replica scenarios for todosync.
//!
//! Each [`harness::Replica`] is a real [`todo_client::FileStore`] in its own
//! temporary directory; replicas exchange changes through a
//! [`harness::SharedLog`] exactly as separate machines sharing a synced
//! folder would. Scenarios drive clocks explicitly so last-writer-wins
//! outcomes are deterministic.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod harness;
