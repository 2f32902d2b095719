pub mod clock;
pub mod config;
pub mod constants;
pub mod dispute;
pub mod error;
pub mod event;
pub mod governance;
pub mod types;

pub use clock::{ManualClock, TermClock};
pub use config::{ConfigRecord, FeesConfig, PhaseTerms, RoundPhases};
pub use constants::*;
pub use dispute::*;
pub use error::ArbitraError;
pub use event::{CourtEvent, EventRecord};
pub use governance::{Governance, GovernorKey};
pub use types::*;
