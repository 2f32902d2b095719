use serde::{Deserialize, Serialize};

use crate::config::ConfigRecord;
use crate::types::{AccountId, Balance, DisputeId, TermId};

/// Notifications emitted for external observers. Every committed operation
/// appends its events to the state database's event log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourtEvent {
    ConfigChangeScheduled {
        /// Record effective at `from_term` before this change was written.
        previous: ConfigRecord,
        new: ConfigRecord,
        from_term: TermId,
    },
    RoundCreated {
        dispute_id: DisputeId,
        round: u32,
        draft_term: TermId,
        jurors: u64,
        juror_fees: Balance,
    },
    RoundAppealed {
        dispute_id: DisputeId,
        round: u32,
        maker: AccountId,
        ruling: u8,
        collateral: Balance,
    },
    RoundConfirmed {
        dispute_id: DisputeId,
        round: u32,
        taker: AccountId,
        ruling: u8,
        collateral: Balance,
    },
    RoundSettled {
        dispute_id: DisputeId,
        round: u32,
        ruled_at: TermId,
    },
}

impl CourtEvent {
    /// Short label used in logs and operator output.
    pub fn kind(&self) -> &'static str {
        match self {
            CourtEvent::ConfigChangeScheduled { .. } => "config_change_scheduled",
            CourtEvent::RoundCreated { .. } => "round_created",
            CourtEvent::RoundAppealed { .. } => "round_appealed",
            CourtEvent::RoundConfirmed { .. } => "round_confirmed",
            CourtEvent::RoundSettled { .. } => "round_settled",
        }
    }
}

/// An event together with its position in the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: u64,
    pub event: CourtEvent,
}
