use arbitra_config::ConfigStore;
use arbitra_core::clock::TermClock;
use arbitra_core::constants::{MAX_METADATA_BYTES, MAX_POSSIBLE_RULINGS, MIN_POSSIBLE_RULINGS};
use arbitra_core::dispute::{
    AppealStake, ConfigSnapshot, Dispute, DisputeState, Round, RoundState,
};
use arbitra_core::error::ArbitraError;
use arbitra_core::event::CourtEvent;
use arbitra_core::types::{AccountId, Balance, DisputeId, MetadataHash, TermId};
use arbitra_state::db::META_NEXT_DISPUTE_ID;
use arbitra_state::{StagedWrites, StateDb};
use tracing::{debug, info};

use crate::escalation;
use crate::registry::JurorRegistry;

/// The dispute round state machine.
///
/// Each public operation validates everything first, stages its writes, and
/// commits them in one transaction, so a failed call leaves no trace.
pub struct DisputeEngine<'a> {
    db: &'a StateDb,
    clock: &'a dyn TermClock,
    registry: &'a dyn JurorRegistry,
}

impl<'a> DisputeEngine<'a> {
    pub fn new(
        db: &'a StateDb,
        clock: &'a dyn TermClock,
        registry: &'a dyn JurorRegistry,
    ) -> Self {
        Self { db, clock, registry }
    }

    // ── Disputes ──────────────────────────────────────────────────────────────

    /// Open a dispute whose first round is drafted at `draft_term`.
    ///
    /// The config in effect at `draft_term` is copied into round 0 and governs
    /// every later round of this dispute.
    pub fn create_dispute(
        &self,
        creator: &AccountId,
        possible_rulings: u8,
        metadata: &[u8],
        draft_term: TermId,
    ) -> Result<(Dispute, Round), ArbitraError> {
        if !(MIN_POSSIBLE_RULINGS..=MAX_POSSIBLE_RULINGS).contains(&possible_rulings) {
            return Err(ArbitraError::InvalidPossibleRulings {
                min: MIN_POSSIBLE_RULINGS,
                max: MAX_POSSIBLE_RULINGS,
                got: possible_rulings,
            });
        }
        if metadata.len() > MAX_METADATA_BYTES {
            return Err(ArbitraError::MetadataTooLong { max: MAX_METADATA_BYTES });
        }
        let now = self.clock.current_term();
        if draft_term <= now {
            return Err(ArbitraError::TooOldTerm {
                requested: draft_term,
                earliest: now.saturating_add(1),
            });
        }

        let id = self.db.next_dispute_id()?;
        let mut dispute = Dispute {
            id,
            creator: creator.clone(),
            possible_rulings,
            metadata_hash: MetadataHash::of(metadata),
            created_term: now,
            draft_term,
            state: DisputeState::Adjudicating,
            round_count: 0,
        };

        let mut staged = StagedWrites::default();
        let round = self.stage_round(&mut dispute, draft_term, None, &mut staged)?;
        staged.disputes.push(dispute.clone());
        staged
            .meta
            .push((META_NEXT_DISPUTE_ID, (id + 1).to_be_bytes().to_vec()));
        self.db.commit(&staged)?;

        info!(dispute = id, draft_term, creator = %creator, "dispute created");
        Ok((dispute, round))
    }

    // ── Rounds ────────────────────────────────────────────────────────────────

    /// Create round `round_index` of `dispute_id`, drafted at `draft_term`.
    ///
    /// Round 0 is created together with its dispute by `create_dispute`.
    /// Appeal rounds follow a confirmed appeal: they reuse the confirmed
    /// round's snapshot and cannot be drafted before its confirmation window
    /// ends.
    ///
    /// # Errors
    /// - `RoundAlreadyExists` / `RoundOutOfOrder` unless `round_index` is the
    ///   next index of the dispute.
    /// - `InvalidRoundState` unless the previous round is confirmed.
    /// - `TooOldTerm` if `draft_term` is before the confirmation window ends.
    /// - `NoActiveJurors` if a final round cannot be staffed.
    pub fn create_round(
        &self,
        dispute_id: DisputeId,
        draft_term: TermId,
        round_index: u32,
    ) -> Result<Round, ArbitraError> {
        let mut dispute = self.load_dispute(dispute_id)?;
        if round_index < dispute.round_count {
            return Err(ArbitraError::RoundAlreadyExists {
                dispute: dispute_id,
                round: round_index,
            });
        }
        if round_index > dispute.round_count {
            return Err(ArbitraError::RoundOutOfOrder {
                dispute: dispute_id,
                round: round_index,
                expected: dispute.round_count,
            });
        }
        if dispute.is_ruled() {
            return Err(ArbitraError::DisputeAlreadyRuled(dispute_id));
        }

        let previous = match round_index {
            0 => None,
            i => {
                let prev = self.load_round(dispute_id, i - 1)?;
                if !matches!(prev.state, RoundState::Confirmed { .. }) {
                    return Err(ArbitraError::InvalidRoundState);
                }
                let earliest = prev.phases().confirm_end;
                if draft_term < earliest {
                    return Err(ArbitraError::TooOldTerm { requested: draft_term, earliest });
                }
                Some(prev)
            }
        };

        let mut staged = StagedWrites::default();
        let round = self.stage_round(&mut dispute, draft_term, previous.as_ref(), &mut staged)?;
        staged.disputes.push(dispute);
        self.db.commit(&staged)?;

        info!(
            dispute = dispute_id,
            round = round_index,
            draft_term,
            jurors = round.jurors,
            "round created"
        );
        Ok(round)
    }

    /// Raise an appeal against the current round of a dispute, proposing
    /// `ruling` and posting `collateral`.
    ///
    /// # Errors
    /// - `FinalRoundNotAppealable` for the final round.
    /// - `AppealWindowNotOpen` / `AppealWindowClosed` outside the appeal phase.
    /// - `InvalidRuling` if `ruling` is not one of the dispute's rulings.
    /// - `InsufficientCollateral` if `collateral` is below the requirement.
    pub fn appeal(
        &self,
        dispute_id: DisputeId,
        round_index: u32,
        maker: &AccountId,
        ruling: u8,
        collateral: Balance,
    ) -> Result<Round, ArbitraError> {
        let dispute = self.load_dispute(dispute_id)?;
        let mut round = self.current_round(&dispute, round_index)?;

        if round.is_final() {
            return Err(ArbitraError::FinalRoundNotAppealable);
        }
        if round.state != RoundState::Active {
            return Err(ArbitraError::InvalidRoundState);
        }
        check_ruling(&dispute, ruling)?;

        let now = self.clock.current_term();
        let phases = round.phases();
        if now < phases.reveal_end {
            return Err(ArbitraError::AppealWindowNotOpen { opens_at: phases.reveal_end });
        }
        if now >= phases.appeal_end {
            return Err(ArbitraError::AppealWindowClosed { closed_at: phases.appeal_end });
        }

        let need = escalation::appeal_collateral(&round)?;
        if collateral < need {
            return Err(ArbitraError::InsufficientCollateral { need, got: collateral });
        }

        round.state = RoundState::Appealed {
            appeal: AppealStake {
                account: maker.clone(),
                ruling,
                collateral,
                at_term: now,
            },
        };
        let staged = StagedWrites {
            rounds: vec![round.clone()],
            events: vec![CourtEvent::RoundAppealed {
                dispute_id,
                round: round_index,
                maker: maker.clone(),
                ruling,
                collateral,
            }],
            ..Default::default()
        };
        self.db.commit(&staged)?;

        info!(dispute = dispute_id, round = round_index, ruling, collateral, "round appealed");
        Ok(round)
    }

    /// Confirm a pending appeal with an opposing `ruling`. Returns the
    /// confirmed round.
    ///
    /// The dispute then awaits `create_round` for the next index, drafted no
    /// earlier than the end of this round's confirmation window.
    pub fn confirm_appeal(
        &self,
        dispute_id: DisputeId,
        round_index: u32,
        taker: &AccountId,
        ruling: u8,
        collateral: Balance,
    ) -> Result<Round, ArbitraError> {
        let dispute = self.load_dispute(dispute_id)?;
        let mut round = self.current_round(&dispute, round_index)?;

        let appeal = match &round.state {
            RoundState::Appealed { appeal } => appeal.clone(),
            _ => return Err(ArbitraError::InvalidRoundState),
        };
        check_ruling(&dispute, ruling)?;
        if ruling == appeal.ruling {
            return Err(ArbitraError::InvalidRuling(ruling));
        }

        let now = self.clock.current_term();
        let phases = round.phases();
        if now < phases.appeal_end {
            return Err(ArbitraError::AppealWindowNotOpen { opens_at: phases.appeal_end });
        }
        if now >= phases.confirm_end {
            return Err(ArbitraError::AppealWindowClosed { closed_at: phases.confirm_end });
        }

        let need = escalation::confirm_collateral(&round)?;
        if collateral < need {
            return Err(ArbitraError::InsufficientCollateral { need, got: collateral });
        }

        round.state = RoundState::Confirmed {
            appeal,
            confirmation: AppealStake {
                account: taker.clone(),
                ruling,
                collateral,
                at_term: now,
            },
        };

        let staged = StagedWrites {
            rounds: vec![round.clone()],
            events: vec![CourtEvent::RoundConfirmed {
                dispute_id,
                round: round_index,
                taker: taker.clone(),
                ruling,
                collateral,
            }],
            ..Default::default()
        };
        self.db.commit(&staged)?;

        info!(
            dispute = dispute_id,
            round = round_index,
            next_draft_term = phases.confirm_end,
            "appeal confirmed"
        );
        Ok(round)
    }

    /// Close the current round once no further appeal or confirmation is
    /// possible, ruling the dispute at this round.
    ///
    /// # Errors
    /// `RoundStillOpen` while the round's appeal (or confirmation) window
    /// is still running.
    pub fn settle_round(
        &self,
        dispute_id: DisputeId,
        round_index: u32,
    ) -> Result<Round, ArbitraError> {
        let mut dispute = self.load_dispute(dispute_id)?;
        let mut round = self.current_round(&dispute, round_index)?;

        let now = self.clock.current_term();
        let phases = round.phases();
        let (until, appeal) = match &round.state {
            RoundState::Active if round.is_final() => (phases.reveal_end, None),
            RoundState::Active => (phases.appeal_end, None),
            RoundState::Appealed { appeal } => (phases.confirm_end, Some(appeal.clone())),
            RoundState::Confirmed { .. } | RoundState::Unchallenged { .. } => {
                return Err(ArbitraError::InvalidRoundState)
            }
        };
        if now < until {
            return Err(ArbitraError::RoundStillOpen { until });
        }

        round.state = RoundState::Unchallenged { appeal };
        dispute.state = DisputeState::Ruled {
            final_round: round_index,
            ruled_at: now,
        };
        let staged = StagedWrites {
            disputes: vec![dispute],
            rounds: vec![round.clone()],
            events: vec![CourtEvent::RoundSettled {
                dispute_id,
                round: round_index,
                ruled_at: now,
            }],
            ..Default::default()
        };
        self.db.commit(&staged)?;

        info!(dispute = dispute_id, round = round_index, "dispute ruled");
        Ok(round)
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    /// Build the next round of `dispute` and add it to `staged`.
    ///
    /// Without `previous` this is round 0 and the snapshot is read from the
    /// config store; this is the only place the store is read for a dispute.
    /// With `previous`, the snapshot is copied from it.
    fn stage_round(
        &self,
        dispute: &mut Dispute,
        draft_term: TermId,
        previous: Option<&Round>,
        staged: &mut StagedWrites,
    ) -> Result<Round, ArbitraError> {
        let (snapshot, params) = match previous {
            None => {
                let config = ConfigStore::new(self.db).effective_config(draft_term)?;
                let params = escalation::first_round(&config, self.registry)?;
                (ConfigSnapshot::freeze(config), params)
            }
            Some(prev) => {
                let params = escalation::next_round(prev, self.registry, draft_term)?;
                (prev.snapshot.clone(), params)
            }
        };

        let round = Round {
            dispute_id: dispute.id,
            index: dispute.round_count,
            kind: params.kind,
            draft_term,
            snapshot,
            jurors: params.jurors,
            juror_fees: params.juror_fees,
            penalty: params.penalty,
            state: RoundState::Active,
        };
        dispute.round_count += 1;

        staged.rounds.push(round.clone());
        staged.events.push(CourtEvent::RoundCreated {
            dispute_id: dispute.id,
            round: round.index,
            draft_term,
            jurors: round.jurors,
            juror_fees: round.juror_fees,
        });
        debug!(
            dispute = dispute.id,
            round = round.index,
            kind = ?round.kind,
            jurors = round.jurors,
            juror_fees = round.juror_fees,
            "round staged"
        );
        Ok(round)
    }

    fn load_dispute(&self, id: DisputeId) -> Result<Dispute, ArbitraError> {
        self.db
            .get_dispute(id)?
            .ok_or(ArbitraError::DisputeNotFound(id))
    }

    fn load_round(&self, dispute: DisputeId, round: u32) -> Result<Round, ArbitraError> {
        self.db
            .get_round(dispute, round)?
            .ok_or(ArbitraError::RoundNotFound { dispute, round })
    }

    /// Load `round_index`, requiring it to be the latest round of an
    /// unruled dispute.
    fn current_round(&self, dispute: &Dispute, round_index: u32) -> Result<Round, ArbitraError> {
        if dispute.is_ruled() {
            return Err(ArbitraError::DisputeAlreadyRuled(dispute.id));
        }
        if round_index >= dispute.round_count {
            return Err(ArbitraError::RoundNotFound {
                dispute: dispute.id,
                round: round_index,
            });
        }
        if round_index != dispute.last_round() {
            return Err(ArbitraError::RoundNotCurrent {
                dispute: dispute.id,
                round: round_index,
            });
        }
        self.load_round(dispute.id, round_index)
    }
}

fn check_ruling(dispute: &Dispute, ruling: u8) -> Result<(), ArbitraError> {
    if ruling == 0 || ruling > dispute.possible_rulings {
        return Err(ArbitraError::InvalidRuling(ruling));
    }
    Ok(())
}
