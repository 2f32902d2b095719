use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ArbitraError;

/// Token amount in the fee token's base units. Fees are commonly quoted with
/// 18 decimals, so u128 leaves ample headroom for juror-count multiplication.
pub type Balance = u128;

/// Court term identifier. Term 0 is genesis; terms only ever increase.
pub type TermId = u64;

/// Sequential dispute identifier, assigned at creation.
pub type DisputeId = u64;

// ── AccountId ────────────────────────────────────────────────────────────────

/// 32-byte identity of a court participant (governor, disputer, appellant).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Deterministic account derived as BLAKE3(label). Used for operator
    /// tooling and test fixtures, never for real key material.
    pub fn from_label(label: &str) -> Self {
        Self(*blake3::hash(label.as_bytes()).as_bytes())
    }

    /// Base-58 encoded string representation.
    pub fn to_b58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }

    pub fn from_b58(s: &str) -> Result<Self, ArbitraError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| ArbitraError::Other(format!("invalid account id: {e}")))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ArbitraError::Other("account id must be 32 bytes".into()))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_b58())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", &self.to_b58()[..8])
    }
}

// ── TokenId ──────────────────────────────────────────────────────────────────

/// Reference to the token fees and collateral are denominated in.
/// The court never moves tokens itself; the ledger resolves this reference.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub [u8; 20]);

impl TokenId {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, ArbitraError> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| ArbitraError::Other(format!("invalid token id: {e}")))?;
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| ArbitraError::Other("token id must be 20 bytes".into()))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId(0x{}…)", &self.to_hex()[..8])
    }
}

// ── MetadataHash ─────────────────────────────────────────────────────────────

/// 32-byte BLAKE3 commitment to off-chain dispute metadata.
/// The court does not interpret this data.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct MetadataHash(pub [u8; 32]);

impl MetadataHash {
    pub fn of(metadata: &[u8]) -> Self {
        Self(*blake3::hash(metadata).as_bytes())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}
