use serde::{Deserialize, Serialize};

use crate::config::{ConfigRecord, RoundPhases};
use crate::types::{AccountId, Balance, DisputeId, MetadataHash, TermId};

// ── ConfigSnapshot ───────────────────────────────────────────────────────────

/// An owned copy of the `ConfigRecord` a dispute was drafted under.
///
/// No mutable accessor exists; once frozen, the snapshot is read-only for
/// the rest of the dispute's life.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot(ConfigRecord);

impl ConfigSnapshot {
    pub fn freeze(record: ConfigRecord) -> Self {
        Self(record)
    }

    pub fn config(&self) -> &ConfigRecord {
        &self.0
    }
}

// ── Dispute ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisputeState {
    /// Rounds are still being drafted, voted, or appealed.
    Adjudicating,
    /// Resolved at `final_round`; no further appeals.
    Ruled { final_round: u32, ruled_at: TermId },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    pub id: DisputeId,
    pub creator: AccountId,
    /// Number of rulings jurors may choose from (1-based).
    pub possible_rulings: u8,
    pub metadata_hash: MetadataHash,
    pub created_term: TermId,
    /// Draft term of round 0; the config snapshot is taken as of this term.
    pub draft_term: TermId,
    pub state: DisputeState,
    /// Number of rounds created so far.
    pub round_count: u32,
}

impl Dispute {
    /// Index of the latest round.
    pub fn last_round(&self) -> u32 {
        self.round_count.saturating_sub(1)
    }

    pub fn is_ruled(&self) -> bool {
        matches!(self.state, DisputeState::Ruled { .. })
    }
}

// ── Round ────────────────────────────────────────────────────────────────────

/// Regular rounds escalate by the appeal step factor; the final round uses
/// registry-weighted juror counts and reduced fees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundKind {
    Regular { index: u32 },
    Final,
}

/// One side of an appeal: who raised or confirmed it, for which ruling,
/// and what collateral was posted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppealStake {
    pub account: AccountId,
    pub ruling: u8,
    pub collateral: Balance,
    pub at_term: TermId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    /// Drafted; commit/reveal/appeal phases running.
    Active,
    /// An appeal was raised and awaits confirmation.
    Appealed { appeal: AppealStake },
    /// The appeal was confirmed; the next round follows via `create_round`.
    Confirmed { appeal: AppealStake, confirmation: AppealStake },
    /// Terminal: the dispute was resolved at this round. Carries the
    /// unconfirmed appeal, if one was raised.
    Unchallenged { appeal: Option<AppealStake> },
}

/// Balance jurors lock against an incoherent vote in a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PenaltyCollateral {
    /// Regular rounds: each drafted seat locks `per_seat`; `total` is the
    /// sum over all seats.
    PerSeat { per_seat: Balance, total: Balance },
    /// Final round: each voter locks `penalty_pct` basis points of their
    /// own active stake.
    StakeShare { penalty_pct: u16 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub dispute_id: DisputeId,
    pub index: u32,
    pub kind: RoundKind,
    pub draft_term: TermId,
    pub snapshot: ConfigSnapshot,
    pub jurors: u64,
    /// `jurors × fee per juror`, fixed at creation.
    pub juror_fees: Balance,
    pub penalty: PenaltyCollateral,
    pub state: RoundState,
}

impl Round {
    pub fn phases(&self) -> RoundPhases {
        self.snapshot.config().round_phases(self.draft_term)
    }

    pub fn is_final(&self) -> bool {
        matches!(self.kind, RoundKind::Final)
    }
}
