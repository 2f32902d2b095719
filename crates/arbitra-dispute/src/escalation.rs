//! Round escalation policy.
//!
//! Every function here reads only a round's frozen snapshot (plus the juror
//! registry for final-round sizing). None of them touch the config schedule,
//! so a dispute escalates under the same parameters it was drafted with.
//!
//! With `first_round_jurors = 5`, `appeal_step_factor = 3` and
//! `max_regular_appeal_rounds = 2`:
//!
//!   round 0 → 5 jurors, round 1 → 15, round 2 → 45, round 3 → final

use arbitra_core::config::{pct, ConfigRecord};
use arbitra_core::dispute::{PenaltyCollateral, Round, RoundKind};
use arbitra_core::error::ArbitraError;
use arbitra_core::types::{Balance, TermId};

use crate::registry::JurorRegistry;

/// Juror count, fees and penalty collateral for a round about to be created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundParams {
    pub kind: RoundKind,
    pub jurors: u64,
    pub juror_fees: Balance,
    pub penalty: PenaltyCollateral,
}

/// Kind of the round at `index`. Indices up to and including
/// `max_regular_appeal_rounds` are regular; the one after is final.
pub fn round_kind(config: &ConfigRecord, index: u32) -> RoundKind {
    if index <= config.max_regular_appeal_rounds {
        RoundKind::Regular { index }
    } else {
        RoundKind::Final
    }
}

/// Parameters of round 0.
pub fn first_round(
    config: &ConfigRecord,
    registry: &dyn JurorRegistry,
) -> Result<RoundParams, ArbitraError> {
    let jurors = config.first_round_jurors;
    Ok(RoundParams {
        kind: RoundKind::Regular { index: 0 },
        jurors,
        juror_fees: juror_fees(jurors, config.fees.juror_fee)?,
        penalty: seat_penalty(config, registry, jurors)?,
    })
}

/// Parameters of the round that follows `previous` once it is confirmed.
///
/// # Errors
/// - `FinalRoundNotAppealable` if `previous` is already the final round.
/// - `NoActiveJurors` if the registry cannot staff a final round.
/// - `ArithmeticOverflow` if the juror count or fees overflow.
pub fn next_round(
    previous: &Round,
    registry: &dyn JurorRegistry,
    draft_term: TermId,
) -> Result<RoundParams, ArbitraError> {
    if previous.is_final() {
        return Err(ArbitraError::FinalRoundNotAppealable);
    }
    let config = previous.snapshot.config();
    let index = previous.index + 1;

    match round_kind(config, index) {
        RoundKind::Regular { index } => {
            let jurors = previous
                .jurors
                .checked_mul(config.appeal_step_factor)
                .ok_or(ArbitraError::ArithmeticOverflow("appeal round jurors"))?;
            Ok(RoundParams {
                kind: RoundKind::Regular { index },
                jurors,
                juror_fees: juror_fees(jurors, config.fees.juror_fee)?,
                penalty: seat_penalty(config, registry, jurors)?,
            })
        }
        RoundKind::Final => {
            let jurors = registry.final_round_jurors(draft_term)?;
            Ok(RoundParams {
                kind: RoundKind::Final,
                jurors,
                juror_fees: juror_fees(jurors, final_round_fee_per_juror(config)?)?,
                penalty: PenaltyCollateral::StakeShare {
                    penalty_pct: config.penalty_pct,
                },
            })
        }
    }
}

/// Per-juror fee in the final round: `juror_fee` scaled by
/// `final_round_reduction` basis points.
pub fn final_round_fee_per_juror(config: &ConfigRecord) -> Result<Balance, ArbitraError> {
    pct(config.fees.juror_fee, config.final_round_reduction)
}

/// Collateral an appellant must post against `round`.
pub fn appeal_collateral(round: &Round) -> Result<Balance, ArbitraError> {
    collateral(round.juror_fees, round.snapshot.config().appeal_collateral_factor)
}

/// Collateral the opposing party must post to confirm an appeal of `round`.
pub fn confirm_collateral(round: &Round) -> Result<Balance, ArbitraError> {
    collateral(
        round.juror_fees,
        round.snapshot.config().appeal_confirm_collateral_factor,
    )
}

/// Penalty collateral of a regular round: `penalty_pct` of the registry's
/// minimum active balance for each of its `jurors` seats.
fn seat_penalty(
    config: &ConfigRecord,
    registry: &dyn JurorRegistry,
    jurors: u64,
) -> Result<PenaltyCollateral, ArbitraError> {
    let per_seat = pct(registry.min_active_balance(), config.penalty_pct)?;
    let total = per_seat
        .checked_mul(jurors as Balance)
        .ok_or(ArbitraError::ArithmeticOverflow("round penalty total"))?;
    Ok(PenaltyCollateral::PerSeat { per_seat, total })
}

fn juror_fees(jurors: u64, fee_per_juror: Balance) -> Result<Balance, ArbitraError> {
    (jurors as Balance)
        .checked_mul(fee_per_juror)
        .ok_or(ArbitraError::ArithmeticOverflow("juror fees"))
}

fn collateral(fees: Balance, factor: u64) -> Result<Balance, ArbitraError> {
    fees.checked_mul(factor as Balance)
        .ok_or(ArbitraError::ArithmeticOverflow("appeal collateral"))
}
