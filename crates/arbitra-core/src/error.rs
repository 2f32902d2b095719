use thiserror::Error;

use crate::types::{Balance, DisputeId, TermId};

#[derive(Debug, Error)]
pub enum ArbitraError {
    // ── Scheduling errors ────────────────────────────────────────────────────
    #[error("sender is not the governor")]
    Unauthorized,

    #[error("term {requested} is too old: earliest schedulable term is {earliest}")]
    TooOldTerm { requested: TermId, earliest: TermId },

    #[error("invalid config value for {field}: {reason}")]
    InvalidConfigValue { field: &'static str, reason: &'static str },

    #[error("term clock cannot move backwards: current {current}, requested {requested}")]
    TermRegression { current: TermId, requested: TermId },

    // ── Dispute errors ───────────────────────────────────────────────────────
    #[error("dispute not found: {0}")]
    DisputeNotFound(DisputeId),

    #[error("dispute {0} has already been ruled")]
    DisputeAlreadyRuled(DisputeId),

    #[error("possible rulings must be between {min} and {max}; got {got}")]
    InvalidPossibleRulings { min: u8, max: u8, got: u8 },

    #[error("dispute metadata exceeds maximum length of {max} bytes")]
    MetadataTooLong { max: usize },

    // ── Round errors ─────────────────────────────────────────────────────────
    #[error("round {round} of dispute {dispute} already exists")]
    RoundAlreadyExists { dispute: DisputeId, round: u32 },

    #[error("round {round} of dispute {dispute} is out of order: next round is {expected}")]
    RoundOutOfOrder { dispute: DisputeId, round: u32, expected: u32 },

    #[error("round {round} of dispute {dispute} not found")]
    RoundNotFound { dispute: DisputeId, round: u32 },

    #[error("round {round} is not the current round of dispute {dispute}")]
    RoundNotCurrent { dispute: DisputeId, round: u32 },

    #[error("invalid round state transition")]
    InvalidRoundState,

    #[error("appeal window not yet open (opens at term {opens_at})")]
    AppealWindowNotOpen { opens_at: TermId },

    #[error("appeal window has closed (closed at term {closed_at})")]
    AppealWindowClosed { closed_at: TermId },

    #[error("round is still open until term {until}")]
    RoundStillOpen { until: TermId },

    #[error("the final round cannot be appealed")]
    FinalRoundNotAppealable,

    #[error("invalid ruling {0}")]
    InvalidRuling(u8),

    #[error("insufficient collateral: need {need}, got {got}")]
    InsufficientCollateral { need: Balance, got: Balance },

    #[error("juror registry reports no active jurors for the final round")]
    NoActiveJurors,

    #[error("arithmetic overflow computing {0}")]
    ArithmeticOverflow(&'static str),

    // ── Serialization / storage ──────────────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),

    // ── Genesis ──────────────────────────────────────────────────────────────
    #[error("state database is not initialized (no genesis config)")]
    NotInitialized,

    #[error("state database is already initialized")]
    AlreadyInitialized,

    #[error("{0}")]
    Other(String),
}
