use arbitra_core::dispute::{
    Dispute, DisputeState, PenaltyCollateral, Round, RoundKind, RoundState,
};
use arbitra_core::error::ArbitraError;
use arbitra_core::types::{DisputeId, TermId};
use arbitra_state::StateDb;

use crate::escalation;
use crate::fee::round_fees;

/// Read-only view over disputes and their rounds.
pub struct DisputeQuery<'a> {
    db: &'a StateDb,
}

impl<'a> DisputeQuery<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self { db }
    }

    pub fn dispute(&self, id: DisputeId) -> Result<Dispute, ArbitraError> {
        self.db.get_dispute(id)?.ok_or(ArbitraError::DisputeNotFound(id))
    }

    /// All rounds of dispute `id`, oldest first.
    pub fn rounds(&self, id: DisputeId) -> Result<Vec<Round>, ArbitraError> {
        self.dispute(id)?;
        self.db.rounds_of(id)
    }

    /// Returns true if the current round of `id` accepts an appeal at `now`.
    pub fn can_appeal(&self, id: DisputeId, now: TermId) -> Result<bool, ArbitraError> {
        let dispute = self.dispute(id)?;
        if dispute.is_ruled() {
            return Ok(false);
        }
        let round = match self.db.get_round(id, dispute.last_round())? {
            Some(r) => r,
            None => return Ok(false),
        };
        Ok(!round.is_final()
            && round.state == RoundState::Active
            && round.phases().in_appeal_window(now))
    }

    /// Human-readable status of a dispute and each of its rounds.
    pub fn describe(&self, id: DisputeId) -> Result<String, ArbitraError> {
        let dispute = self.dispute(id)?;
        let status = match dispute.state {
            DisputeState::Adjudicating => "adjudicating".to_string(),
            DisputeState::Ruled { final_round, ruled_at } => {
                format!("ruled at round {} (term {})", final_round, ruled_at)
            }
        };

        let mut lines = vec![format!(
            "Dispute {} by {} | {} rulings | metadata {} | drafted at term {} | {}",
            dispute.id,
            dispute.creator,
            dispute.possible_rulings,
            dispute.metadata_hash.to_hex(),
            dispute.draft_term,
            status
        )];

        for round in self.db.rounds_of(id)? {
            let kind = match round.kind {
                RoundKind::Regular { index } => format!("regular #{}", index),
                RoundKind::Final => "final".to_string(),
            };
            let phases = round.phases();
            let fees = round_fees(&round)?;
            let state = match &round.state {
                RoundState::Active => "active".to_string(),
                RoundState::Appealed { appeal } => format!("appealed for ruling {}", appeal.ruling),
                RoundState::Confirmed { appeal, confirmation } => format!(
                    "confirmed ({} vs {})",
                    appeal.ruling, confirmation.ruling
                ),
                RoundState::Unchallenged { .. } => "closed".to_string(),
            };
            let collateral = if round.is_final() {
                String::new()
            } else {
                format!(
                    " | collateral {} / {}",
                    escalation::appeal_collateral(&round)?,
                    escalation::confirm_collateral(&round)?
                )
            };
            let penalty = match round.penalty {
                PenaltyCollateral::PerSeat { per_seat, total } => {
                    format!("penalty {} per seat, {} locked", per_seat, total)
                }
                PenaltyCollateral::StakeShare { penalty_pct } => {
                    format!("penalty {}bp of voter stake", penalty_pct)
                }
            };
            lines.push(format!(
                "  round {} ({}) | draft {} reveal-end {} appeal-end {} confirm-end {} | \
                 {} jurors | juror fees {} total {} {}{} | {} | {}",
                round.index,
                kind,
                phases.draft_term,
                phases.reveal_end,
                phases.appeal_end,
                phases.confirm_end,
                round.jurors,
                round.juror_fees,
                fees.total,
                fees.token,
                collateral,
                penalty,
                state
            ));
        }
        Ok(lines.join("\n"))
    }
}
