use arbitra_core::error::ArbitraError;
use arbitra_core::types::{Balance, TermId};

/// The parts of the juror registry the round engine depends on.
///
/// Drafting, staking and activation all live behind this boundary; the
/// court only asks how big the final round is and what a single draft
/// seat is backed by.
pub trait JurorRegistry {
    /// Minimum active balance a juror must hold to be drafted. Each regular
    /// draft seat is backed by this amount.
    fn min_active_balance(&self) -> Balance;

    /// Juror count for a final round drafted at `term`, weighted by
    /// active stake.
    fn final_round_jurors(&self, term: TermId) -> Result<u64, ArbitraError>;
}

/// Registry with a fixed total active stake. Final-round size is the
/// number of minimum-balance units that stake covers.
#[derive(Clone, Debug)]
pub struct StaticJurorRegistry {
    pub min_active_balance: Balance,
    pub total_active_balance: Balance,
}

impl JurorRegistry for StaticJurorRegistry {
    fn min_active_balance(&self) -> Balance {
        self.min_active_balance
    }

    fn final_round_jurors(&self, _term: TermId) -> Result<u64, ArbitraError> {
        if self.min_active_balance == 0 {
            return Err(ArbitraError::NoActiveJurors);
        }
        let units = self.total_active_balance / self.min_active_balance;
        match u64::try_from(units) {
            Ok(0) => Err(ArbitraError::NoActiveJurors),
            Ok(n) => Ok(n),
            Err(_) => Err(ArbitraError::ArithmeticOverflow("final round jurors")),
        }
    }
}
