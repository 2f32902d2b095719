use arbitra_core::config::ConfigRecord;
use arbitra_core::constants::DEFAULT_MIN_NOTICE_TERMS;
use arbitra_core::error::ArbitraError;
use arbitra_core::types::AccountId;
use serde::{Deserialize, Serialize};

/// Deployment parameters for a new court.
///
/// Stored as JSON next to the state database so a node can be re-initialised
/// with the same governor and initial config.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenesisParams {
    /// Base-58 account id of the governor, the only account allowed to
    /// schedule config changes.
    pub governor: String,
    /// Config in effect from the genesis term until the first scheduled change.
    pub initial_config: ConfigRecord,
    /// Terms of notice a config change must give.
    #[serde(default = "default_min_notice_terms")]
    pub min_notice_terms: u64,
}

fn default_min_notice_terms() -> u64 {
    DEFAULT_MIN_NOTICE_TERMS
}

impl GenesisParams {
    pub fn new(governor: &AccountId, initial_config: ConfigRecord) -> Self {
        Self {
            governor: governor.to_b58(),
            initial_config,
            min_notice_terms: DEFAULT_MIN_NOTICE_TERMS,
        }
    }

    pub fn governor_id(&self) -> Result<AccountId, ArbitraError> {
        AccountId::from_b58(&self.governor)
    }

    pub fn from_json(json: &str) -> Result<Self, ArbitraError> {
        serde_json::from_str(json).map_err(|e| ArbitraError::Serialization(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ArbitraError> {
        serde_json::to_string_pretty(self).map_err(|e| ArbitraError::Serialization(e.to_string()))
    }
}
