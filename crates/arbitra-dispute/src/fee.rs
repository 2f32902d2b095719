use arbitra_core::dispute::{Round, RoundKind};
use arbitra_core::error::ArbitraError;
use arbitra_core::types::{Balance, TokenId};
use serde::Serialize;

/// Breakdown of what a round costs the party that pays for it.
/// Amounts are handed to the token ledger; the court moves nothing itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoundFees {
    pub token: TokenId,
    pub heartbeat_fee: Balance,
    pub juror_fees: Balance,
    pub draft_fees: Balance,
    pub settle_fees: Balance,
    pub total: Balance,
}

/// Fees for `round`, computed from its frozen snapshot.
///
/// Regular rounds pay the heartbeat, the juror fees, and a draft and settle
/// fee per seat. The final round has no draft, so it pays only the heartbeat
/// and its reduced juror fees.
pub fn round_fees(round: &Round) -> Result<RoundFees, ArbitraError> {
    let config = round.snapshot.config();
    let seats = round.jurors as Balance;

    let (draft_fees, settle_fees) = match round.kind {
        RoundKind::Regular { .. } => (
            seats
                .checked_mul(config.fees.draft_fee)
                .ok_or(ArbitraError::ArithmeticOverflow("draft fees"))?,
            seats
                .checked_mul(config.fees.settle_fee)
                .ok_or(ArbitraError::ArithmeticOverflow("settle fees"))?,
        ),
        RoundKind::Final => (0, 0),
    };

    let total = [config.fees.heartbeat_fee, round.juror_fees, draft_fees, settle_fees]
        .into_iter()
        .try_fold(0 as Balance, |acc, v| acc.checked_add(v))
        .ok_or(ArbitraError::ArithmeticOverflow("round fees"))?;

    Ok(RoundFees {
        token: config.fee_token,
        heartbeat_fee: config.fees.heartbeat_fee,
        juror_fees: round.juror_fees,
        draft_fees,
        settle_fees,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbitra_core::config::ConfigRecord;
    use arbitra_core::dispute::{ConfigSnapshot, PenaltyCollateral, RoundState};

    const UNIT: Balance = 1_000_000_000_000_000_000;

    fn round(kind: RoundKind, jurors: u64, juror_fees: Balance) -> Round {
        Round {
            dispute_id: 1,
            index: 0,
            kind,
            draft_term: 2,
            snapshot: ConfigSnapshot::freeze(ConfigRecord::default()),
            jurors,
            juror_fees,
            penalty: PenaltyCollateral::StakeShare { penalty_pct: 100 },
            state: RoundState::Active,
        }
    }

    #[test]
    fn regular_round_fees() {
        let f = round_fees(&round(RoundKind::Regular { index: 0 }, 5, 50 * UNIT)).unwrap();
        assert_eq!(f.heartbeat_fee, 20 * UNIT);
        assert_eq!(f.draft_fees, 150 * UNIT);
        assert_eq!(f.settle_fees, 200 * UNIT);
        assert_eq!(f.total, (20 + 50 + 150 + 200) * UNIT);
    }

    #[test]
    fn final_round_skips_seat_fees() {
        let f = round_fees(&round(RoundKind::Final, 45, 100 * UNIT)).unwrap();
        assert_eq!(f.draft_fees, 0);
        assert_eq!(f.settle_fees, 0);
        assert_eq!(f.total, 120 * UNIT);
    }
}
