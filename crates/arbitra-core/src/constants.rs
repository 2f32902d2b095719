/// ─── Arbitra Protocol Constants ─────────────────────────────────────────────
///
/// Limits that bound every `ConfigRecord`, independent of what governance
/// schedules. Changing any of these is a protocol upgrade, not a config change.

// ── Percentages ──────────────────────────────────────────────────────────────

/// Basis for percentage fields (`penalty_pct`, `final_round_reduction`).
/// 10_000 = 100%.
pub const PCT_BASE: u16 = 10_000;

// ── Phase lengths ────────────────────────────────────────────────────────────

/// Upper bound for any single adjudication phase, in terms.
/// Roughly one year at one-hour terms.
pub const MAX_PHASE_TERMS: u64 = 8_670;

// ── Escalation ───────────────────────────────────────────────────────────────

/// Hard ceiling on `max_regular_appeal_rounds`. Juror counts grow
/// geometrically with each regular round, so this also bounds draft size.
pub const MAX_REGULAR_APPEAL_ROUNDS_LIMIT: u32 = 10;

// ── Scheduling ───────────────────────────────────────────────────────────────

/// Default lead time for config changes: a change for term T is accepted
/// only while `T > current_term + DEFAULT_MIN_NOTICE_TERMS`.
pub const DEFAULT_MIN_NOTICE_TERMS: u64 = 1;

/// The term holding the genesis configuration. Always present in the schedule.
pub const GENESIS_TERM: u64 = 0;

// ── Rulings ──────────────────────────────────────────────────────────────────

/// Minimum number of rulings a dispute may offer.
pub const MIN_POSSIBLE_RULINGS: u8 = 2;

/// Maximum number of rulings a dispute may offer.
pub const MAX_POSSIBLE_RULINGS: u8 = 16;

/// Maximum size of dispute metadata accepted before hashing.
pub const MAX_METADATA_BYTES: usize = 1024;
