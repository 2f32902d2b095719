//! arbitra-state
//!
//! Persistent storage for the court: the term-indexed config schedule,
//! disputes, rounds, and the event log, all in one sled database.

pub mod db;

pub use db::{StagedWrites, StateDb};
