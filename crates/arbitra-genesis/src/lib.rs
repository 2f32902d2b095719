//! arbitra-genesis
//!
//! Initialises an empty `StateDb` as a court: records the governor and the
//! notice period, and writes the initial config at the genesis term. Every
//! later config change goes through the scheduler.

pub mod params;

pub use params::GenesisParams;

use arbitra_core::constants::GENESIS_TERM;
use arbitra_core::error::ArbitraError;
use arbitra_core::types::AccountId;
use arbitra_state::db::{
    META_CURRENT_TERM, META_GOVERNOR, META_MIN_NOTICE_TERMS, META_NEXT_DISPUTE_ID,
};
use arbitra_state::{StagedWrites, StateDb};
use tracing::info;

/// Apply `params` to an empty `StateDb`. Returns the governor's account id.
///
/// # Errors
/// - `AlreadyInitialized` if the database already holds a config schedule.
/// - `InvalidConfigValue` if the initial config fails validation.
pub fn apply_genesis(db: &StateDb, params: &GenesisParams) -> Result<AccountId, ArbitraError> {
    if db.has_genesis()? {
        return Err(ArbitraError::AlreadyInitialized);
    }
    let governor = params.governor_id()?;
    params.initial_config.validate()?;

    info!(governor = %governor, "applying court genesis");

    let staged = StagedWrites {
        configs: vec![(GENESIS_TERM, params.initial_config.clone())],
        meta: vec![
            (META_GOVERNOR, governor.as_bytes().to_vec()),
            (META_MIN_NOTICE_TERMS, params.min_notice_terms.to_be_bytes().to_vec()),
            (META_CURRENT_TERM, GENESIS_TERM.to_be_bytes().to_vec()),
            (META_NEXT_DISPUTE_ID, 0u64.to_be_bytes().to_vec()),
        ],
        ..Default::default()
    };
    db.commit(&staged)?;
    db.flush()?;

    info!(
        term = GENESIS_TERM,
        min_notice_terms = params.min_notice_terms,
        "genesis config committed"
    );
    Ok(governor)
}
