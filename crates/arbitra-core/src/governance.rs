use crate::types::AccountId;

/// Answers whether an identity currently holds the governor capability.
/// Rotating the governor is handled outside the court.
pub trait Governance {
    fn is_governor(&self, who: &AccountId) -> bool;
}

/// A single fixed governor key.
#[derive(Clone, Debug)]
pub struct GovernorKey(pub AccountId);

impl Governance for GovernorKey {
    fn is_governor(&self, who: &AccountId) -> bool {
        self.0 == *who
    }
}
