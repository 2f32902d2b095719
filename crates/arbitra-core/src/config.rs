//! Court configuration records.
//!
//! A `ConfigRecord` is an immutable value. Governance never edits one in
//! place: it schedules a whole new record for a future term, and disputes
//! keep their own copy from the moment their first round is drafted.

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_PHASE_TERMS, MAX_REGULAR_APPEAL_ROUNDS_LIMIT, PCT_BASE};
use crate::error::ArbitraError;
use crate::types::{Balance, TermId, TokenId};

/// Fee amounts, in base units of `ConfigRecord::fee_token`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeesConfig {
    /// Paid to each drafted juror per round.
    pub juror_fee: Balance,
    /// Flat fee per round covering the term heartbeat.
    pub heartbeat_fee: Balance,
    /// Paid per drafted seat to whoever executes the draft.
    pub draft_fee: Balance,
    /// Paid per drafted seat to whoever settles penalties.
    pub settle_fee: Balance,
}

/// Length of each adjudication phase, in terms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTerms {
    pub commit_terms: u64,
    pub reveal_terms: u64,
    pub appeal_terms: u64,
    pub appeal_confirm_terms: u64,
}

/// The full set of fee, duration and escalation parameters effective from
/// some term onward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub fee_token: TokenId,
    pub fees: FeesConfig,
    pub terms: PhaseTerms,
    /// Share of a juror's locked balance slashed for voting against the
    /// majority, in basis points of `PCT_BASE`.
    pub penalty_pct: u16,
    /// Share of the regular juror fee paid per juror in the final round,
    /// in basis points of `PCT_BASE`.
    pub final_round_reduction: u16,
    pub first_round_jurors: u64,
    pub appeal_step_factor: u64,
    pub max_regular_appeal_rounds: u32,
    pub appeal_collateral_factor: u64,
    pub appeal_confirm_collateral_factor: u64,
}

impl ConfigRecord {
    /// Structural validation. Runs before any write that stores a record.
    pub fn validate(&self) -> Result<(), ArbitraError> {
        if self.penalty_pct > PCT_BASE {
            return Err(invalid("penalty_pct", "must not exceed PCT_BASE"));
        }
        if self.final_round_reduction > PCT_BASE {
            return Err(invalid("final_round_reduction", "must not exceed PCT_BASE"));
        }

        let phases = [
            ("commit_terms", self.terms.commit_terms),
            ("reveal_terms", self.terms.reveal_terms),
            ("appeal_terms", self.terms.appeal_terms),
            ("appeal_confirm_terms", self.terms.appeal_confirm_terms),
        ];
        for (field, len) in phases {
            if len == 0 {
                return Err(invalid(field, "phase must last at least one term"));
            }
            if len > MAX_PHASE_TERMS {
                return Err(invalid(field, "phase exceeds MAX_PHASE_TERMS"));
            }
        }

        if self.first_round_jurors == 0 {
            return Err(invalid("first_round_jurors", "must be greater than zero"));
        }
        if self.appeal_step_factor == 0 {
            return Err(invalid("appeal_step_factor", "must be at least one"));
        }
        if self.max_regular_appeal_rounds == 0 {
            return Err(invalid("max_regular_appeal_rounds", "must be greater than zero"));
        }
        if self.max_regular_appeal_rounds > MAX_REGULAR_APPEAL_ROUNDS_LIMIT {
            return Err(invalid(
                "max_regular_appeal_rounds",
                "exceeds MAX_REGULAR_APPEAL_ROUNDS_LIMIT",
            ));
        }
        if self.appeal_collateral_factor == 0 {
            return Err(invalid("appeal_collateral_factor", "must be greater than zero"));
        }
        if self.appeal_confirm_collateral_factor == 0 {
            return Err(invalid(
                "appeal_confirm_collateral_factor",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Phase boundaries for a round drafted at `draft_term`.
    pub fn round_phases(&self, draft_term: TermId) -> RoundPhases {
        let commit_end = draft_term.saturating_add(self.terms.commit_terms);
        let reveal_end = commit_end.saturating_add(self.terms.reveal_terms);
        let appeal_end = reveal_end.saturating_add(self.terms.appeal_terms);
        let confirm_end = appeal_end.saturating_add(self.terms.appeal_confirm_terms);
        RoundPhases {
            draft_term,
            commit_end,
            reveal_end,
            appeal_end,
            confirm_end,
        }
    }
}

/// Genesis defaults. Fees assume an 18-decimal fee token.
impl Default for ConfigRecord {
    fn default() -> Self {
        const UNIT: Balance = 1_000_000_000_000_000_000;
        Self {
            fee_token: TokenId([0u8; 20]),
            fees: FeesConfig {
                juror_fee: 10 * UNIT,
                heartbeat_fee: 20 * UNIT,
                draft_fee: 30 * UNIT,
                settle_fee: 40 * UNIT,
            },
            terms: PhaseTerms {
                commit_terms: 1,
                reveal_terms: 2,
                appeal_terms: 3,
                appeal_confirm_terms: 4,
            },
            penalty_pct: 100,
            final_round_reduction: 3_300,
            first_round_jurors: 5,
            appeal_step_factor: 3,
            max_regular_appeal_rounds: 2,
            appeal_collateral_factor: 4,
            appeal_confirm_collateral_factor: 6,
        }
    }
}

fn invalid(field: &'static str, reason: &'static str) -> ArbitraError {
    ArbitraError::InvalidConfigValue { field, reason }
}

/// Term boundaries of one round. Each window is half-open: a phase covers
/// `[start, end)`, and the next phase starts where the previous one ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundPhases {
    pub draft_term: TermId,
    pub commit_end: TermId,
    pub reveal_end: TermId,
    pub appeal_end: TermId,
    pub confirm_end: TermId,
}

impl RoundPhases {
    pub fn in_appeal_window(&self, term: TermId) -> bool {
        term >= self.reveal_end && term < self.appeal_end
    }

    pub fn in_confirm_window(&self, term: TermId) -> bool {
        term >= self.appeal_end && term < self.confirm_end
    }
}

/// `amount × pct / PCT_BASE`, checked.
pub fn pct(amount: Balance, pct: u16) -> Result<Balance, ArbitraError> {
    amount
        .checked_mul(pct as Balance)
        .map(|v| v / PCT_BASE as Balance)
        .ok_or(ArbitraError::ArithmeticOverflow("percentage"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        ConfigRecord::default().validate().unwrap();
    }

    #[test]
    fn zero_step_factor_rejected() {
        let mut c = ConfigRecord::default();
        c.appeal_step_factor = 0;
        let err = c.validate().unwrap_err();
        assert!(matches!(
            err,
            ArbitraError::InvalidConfigValue { field: "appeal_step_factor", .. }
        ));
    }

    #[test]
    fn penalty_above_base_rejected() {
        let mut c = ConfigRecord::default();
        c.penalty_pct = PCT_BASE + 1;
        assert!(c.validate().is_err());
    }

    #[test]
    fn zero_length_phase_rejected() {
        let mut c = ConfigRecord::default();
        c.terms.reveal_terms = 0;
        let err = c.validate().unwrap_err();
        assert!(matches!(
            err,
            ArbitraError::InvalidConfigValue { field: "reveal_terms", .. }
        ));
    }

    #[test]
    fn too_many_regular_rounds_rejected() {
        let mut c = ConfigRecord::default();
        c.max_regular_appeal_rounds = MAX_REGULAR_APPEAL_ROUNDS_LIMIT + 1;
        assert!(c.validate().is_err());
    }

    #[test]
    fn phases_are_contiguous() {
        // commit 1, reveal 2, appeal 3, confirm 4
        let p = ConfigRecord::default().round_phases(2);
        assert_eq!(p.commit_end, 3);
        assert_eq!(p.reveal_end, 5);
        assert_eq!(p.appeal_end, 8);
        assert_eq!(p.confirm_end, 12);

        assert!(!p.in_appeal_window(4));
        assert!(p.in_appeal_window(5));
        assert!(p.in_appeal_window(7));
        assert!(!p.in_appeal_window(8));
        assert!(p.in_confirm_window(8));
        assert!(!p.in_confirm_window(12));
    }

    #[test]
    fn pct_of_amount() {
        assert_eq!(pct(10_000, 3_300).unwrap(), 3_300);
        assert_eq!(pct(1_000, PCT_BASE).unwrap(), 1_000);
        assert!(pct(Balance::MAX, 2).is_err());
    }

    #[test]
    fn json_roundtrip_preserves_large_fees() {
        let c = ConfigRecord::default();
        let json = serde_json::to_string(&c).unwrap();
        let back: ConfigRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
