use arbitra_core::config::ConfigRecord;
use arbitra_core::dispute::{Dispute, Round};
use arbitra_core::error::ArbitraError;
use arbitra_core::event::{CourtEvent, EventRecord};
use arbitra_core::types::{AccountId, DisputeId, TermId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{TransactionResult, Transactional};
use std::path::Path;
use tracing::debug;

pub const META_GOVERNOR: &str = "governor";
pub const META_CURRENT_TERM: &str = "current_term";
pub const META_MIN_NOTICE_TERMS: &str = "min_notice_terms";
pub const META_NEXT_DISPUTE_ID: &str = "next_dispute_id";

/// All writes of one court operation, staged before atomic commit.
#[derive(Default, Debug)]
pub struct StagedWrites {
    pub configs: Vec<(TermId, ConfigRecord)>,
    pub disputes: Vec<Dispute>,
    pub rounds: Vec<Round>,
    pub events: Vec<CourtEvent>,
    pub meta: Vec<(&'static str, Vec<u8>)>,
}

/// Persistent court state backed by sled.
///
/// Named trees:
///   config_schedule — TermId BE              → bincode(ConfigRecord)
///   disputes        — DisputeId BE           → bincode(Dispute)
///   rounds          — DisputeId BE ‖ u32 BE  → bincode(Round)
///   events          — seq BE                 → bincode(CourtEvent)
///   meta            — utf8 key bytes         → raw bytes
///
/// Big-endian keys keep sled's lexicographic order equal to numeric order,
/// which the config schedule relies on for "latest term ≤ T" lookups.
pub struct StateDb {
    _db: sled::Db,
    config_schedule: sled::Tree,
    disputes: sled::Tree,
    rounds: sled::Tree,
    events: sled::Tree,
    meta: sled::Tree,
}

impl StateDb {
    /// Open or create the state database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ArbitraError> {
        let db = sled::open(path).map_err(storage)?;
        let config_schedule = db.open_tree("config_schedule").map_err(storage)?;
        let disputes = db.open_tree("disputes").map_err(storage)?;
        let rounds = db.open_tree("rounds").map_err(storage)?;
        let events = db.open_tree("events").map_err(storage)?;
        let meta = db.open_tree("meta").map_err(storage)?;
        Ok(Self { _db: db, config_schedule, disputes, rounds, events, meta })
    }

    // ── Config schedule ──────────────────────────────────────────────────────

    /// The record scheduled exactly at `term`, if any.
    pub fn get_config(&self, term: TermId) -> Result<Option<ConfigRecord>, ArbitraError> {
        match self.config_schedule.get(term.to_be_bytes()).map_err(storage)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// The entry with the greatest scheduled term ≤ `term`.
    pub fn config_at_or_before(
        &self,
        term: TermId,
    ) -> Result<Option<(TermId, ConfigRecord)>, ArbitraError> {
        match self.config_schedule.range(..=term.to_be_bytes()).next_back() {
            Some(item) => {
                let (key, bytes) = item.map_err(storage)?;
                let scheduled = decode_u64(&key)?;
                debug!(requested = term, scheduled, "resolved config entry");
                Ok(Some((scheduled, decode(&bytes)?)))
            }
            None => Ok(None),
        }
    }

    /// Every scheduled entry, in term order.
    pub fn config_schedule(&self) -> Result<Vec<(TermId, ConfigRecord)>, ArbitraError> {
        let mut out = Vec::new();
        for item in self.config_schedule.iter() {
            let (key, bytes) = item.map_err(storage)?;
            out.push((decode_u64(&key)?, decode(&bytes)?));
        }
        Ok(out)
    }

    pub fn has_genesis(&self) -> Result<bool, ArbitraError> {
        self.config_schedule
            .contains_key(0u64.to_be_bytes())
            .map_err(storage)
    }

    // ── Disputes ─────────────────────────────────────────────────────────────

    pub fn get_dispute(&self, id: DisputeId) -> Result<Option<Dispute>, ArbitraError> {
        match self.disputes.get(id.to_be_bytes()).map_err(storage)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// The id the next created dispute will receive.
    pub fn next_dispute_id(&self) -> Result<DisputeId, ArbitraError> {
        Ok(self.get_u64_meta(META_NEXT_DISPUTE_ID)?.unwrap_or(0))
    }

    // ── Rounds ───────────────────────────────────────────────────────────────

    pub fn get_round(&self, dispute: DisputeId, index: u32) -> Result<Option<Round>, ArbitraError> {
        match self.rounds.get(round_key(dispute, index)).map_err(storage)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All rounds of `dispute`, in index order.
    pub fn rounds_of(&self, dispute: DisputeId) -> Result<Vec<Round>, ArbitraError> {
        let mut out = Vec::new();
        for item in self.rounds.scan_prefix(dispute.to_be_bytes()) {
            let (_, bytes) = item.map_err(storage)?;
            out.push(decode(&bytes)?);
        }
        Ok(out)
    }

    // ── Events ───────────────────────────────────────────────────────────────

    /// Events with sequence number ≥ `seq`, in order.
    pub fn events_since(&self, seq: u64) -> Result<Vec<EventRecord>, ArbitraError> {
        let mut out = Vec::new();
        for item in self.events.range(seq.to_be_bytes()..) {
            let (key, bytes) = item.map_err(storage)?;
            out.push(EventRecord {
                seq: decode_u64(&key)?,
                event: decode(&bytes)?,
            });
        }
        Ok(out)
    }

    fn next_event_seq(&self) -> Result<u64, ArbitraError> {
        match self.events.last().map_err(storage)? {
            Some((key, _)) => Ok(decode_u64(&key)? + 1),
            None => Ok(0),
        }
    }

    // ── Meta ─────────────────────────────────────────────────────────────────

    pub fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), ArbitraError> {
        self.meta.insert(key.as_bytes(), value).map_err(storage)?;
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, ArbitraError> {
        self.meta
            .get(key.as_bytes())
            .map(|v| v.map(|iv| iv.to_vec()))
            .map_err(storage)
    }

    pub fn get_u64_meta(&self, key: &str) -> Result<Option<u64>, ArbitraError> {
        match self.get_meta(key)? {
            Some(bytes) => Ok(Some(decode_u64(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn governor(&self) -> Result<Option<AccountId>, ArbitraError> {
        match self.get_meta(META_GOVERNOR)? {
            Some(bytes) => {
                let arr: [u8; 32] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| ArbitraError::Serialization("governor must be 32 bytes".into()))?;
                Ok(Some(AccountId::from_bytes(arr)))
            }
            None => Ok(None),
        }
    }

    // ── Commit ───────────────────────────────────────────────────────────────

    /// Apply every staged write in a single sled transaction across all
    /// trees. Either all writes land or none do.
    ///
    /// Events are assigned consecutive sequence numbers after the current
    /// tail of the log.
    pub fn commit(&self, staged: &StagedWrites) -> Result<(), ArbitraError> {
        // Encode everything up front so a serialization failure aborts
        // before the transaction starts.
        let configs = staged
            .configs
            .iter()
            .map(|(term, c)| Ok((term.to_be_bytes().to_vec(), encode(c)?)))
            .collect::<Result<Vec<_>, ArbitraError>>()?;
        let disputes = staged
            .disputes
            .iter()
            .map(|d| Ok((d.id.to_be_bytes().to_vec(), encode(d)?)))
            .collect::<Result<Vec<_>, ArbitraError>>()?;
        let rounds = staged
            .rounds
            .iter()
            .map(|r| Ok((round_key(r.dispute_id, r.index), encode(r)?)))
            .collect::<Result<Vec<_>, ArbitraError>>()?;
        let first_seq = self.next_event_seq()?;
        let events = staged
            .events
            .iter()
            .enumerate()
            .map(|(i, e)| Ok(((first_seq + i as u64).to_be_bytes().to_vec(), encode(e)?)))
            .collect::<Result<Vec<_>, ArbitraError>>()?;

        let result: TransactionResult<(), ()> = (
            &self.config_schedule,
            &self.disputes,
            &self.rounds,
            &self.events,
            &self.meta,
        )
            .transaction(|(tx_configs, tx_disputes, tx_rounds, tx_events, tx_meta)| {
                for (k, v) in &configs {
                    tx_configs.insert(k.as_slice(), v.as_slice())?;
                }
                for (k, v) in &disputes {
                    tx_disputes.insert(k.as_slice(), v.as_slice())?;
                }
                for (k, v) in &rounds {
                    tx_rounds.insert(k.as_slice(), v.as_slice())?;
                }
                for (k, v) in &events {
                    tx_events.insert(k.as_slice(), v.as_slice())?;
                }
                for (k, v) in &staged.meta {
                    tx_meta.insert(k.as_bytes(), v.as_slice())?;
                }
                Ok(())
            });
        result.map_err(|e| ArbitraError::Storage(format!("{e:?}")))?;

        debug!(
            configs = configs.len(),
            disputes = disputes.len(),
            rounds = rounds.len(),
            events = events.len(),
            "committed staged writes"
        );
        Ok(())
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), ArbitraError> {
        self._db.flush().map_err(storage)?;
        Ok(())
    }
}

fn round_key(dispute: DisputeId, index: u32) -> Vec<u8> {
    let mut key = Vec::with_capacity(12);
    key.extend_from_slice(&dispute.to_be_bytes());
    key.extend_from_slice(&index.to_be_bytes());
    key
}

fn storage(e: sled::Error) -> ArbitraError {
    ArbitraError::Storage(e.to_string())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ArbitraError> {
    bincode::serialize(value).map_err(|e| ArbitraError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ArbitraError> {
    bincode::deserialize(bytes).map_err(|e| ArbitraError::Serialization(e.to_string()))
}

fn decode_u64(bytes: &[u8]) -> Result<u64, ArbitraError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| ArbitraError::Serialization(format!("expected 8-byte key, got {}", bytes.len())))?;
    Ok(u64::from_be_bytes(arr))
}
