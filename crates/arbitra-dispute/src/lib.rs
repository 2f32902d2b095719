//! arbitra-dispute
//!
//! Dispute round lifecycle. `DisputeEngine` creates rounds against a frozen
//! config snapshot and drives them through appeal, confirmation and
//! settlement; `escalation` derives each appeal round from the previous one
//! without ever re-reading the live config schedule.

pub mod engine;
pub mod escalation;
pub mod fee;
pub mod query;
pub mod registry;

pub use engine::DisputeEngine;
pub use fee::{round_fees, RoundFees};
pub use query::DisputeQuery;
pub use registry::{JurorRegistry, StaticJurorRegistry};
