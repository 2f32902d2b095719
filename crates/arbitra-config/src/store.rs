use arbitra_core::config::ConfigRecord;
use arbitra_core::error::ArbitraError;
use arbitra_core::types::TermId;
use arbitra_state::StateDb;

/// Read side of the config schedule.
pub struct ConfigStore<'a> {
    db: &'a StateDb,
}

impl<'a> ConfigStore<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self { db }
    }

    /// The record in effect at `term`: the last change scheduled at or
    /// before it. Past, present and future terms all resolve the same way.
    ///
    /// # Errors
    /// `NotInitialized` if genesis has not written the term-0 record.
    pub fn effective_config(&self, term: TermId) -> Result<ConfigRecord, ArbitraError> {
        self.effective_entry(term).map(|(_, c)| c)
    }

    /// Like `effective_config`, also returning the term the record was
    /// scheduled at.
    pub fn effective_entry(&self, term: TermId) -> Result<(TermId, ConfigRecord), ArbitraError> {
        self.db
            .config_at_or_before(term)?
            .ok_or(ArbitraError::NotInitialized)
    }

    /// Every scheduled entry, genesis first.
    pub fn schedule(&self) -> Result<Vec<(TermId, ConfigRecord)>, ArbitraError> {
        self.db.config_schedule()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbitra_state::StagedWrites;

    fn temp_db(name: &str) -> StateDb {
        let dir = std::env::temp_dir().join(format!("arbitra_store_test_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        StateDb::open(&dir).expect("open temp db")
    }

    fn record(jurors: u64) -> ConfigRecord {
        let mut c = ConfigRecord::default();
        c.first_round_jurors = jurors;
        c
    }

    fn seed(db: &StateDb, entries: Vec<(TermId, ConfigRecord)>) {
        db.commit(&StagedWrites { configs: entries, ..Default::default() })
            .unwrap();
    }

    #[test]
    fn uninitialized_store_fails() {
        let db = temp_db("uninit");
        let err = ConfigStore::new(&db).effective_config(0).unwrap_err();
        assert!(matches!(err, ArbitraError::NotInitialized));
    }

    #[test]
    fn changes_at_three_and_four() {
        let db = temp_db("three_four");
        seed(&db, vec![(0, record(5)), (3, record(10)), (4, record(15))]);
        let store = ConfigStore::new(&db);

        assert_eq!(store.effective_config(2).unwrap(), record(5));
        assert_eq!(store.effective_config(3).unwrap(), record(10));
        assert_eq!(store.effective_config(4).unwrap(), record(15));
        assert_eq!(store.effective_config(1_000).unwrap(), record(15));
    }

    #[test]
    fn resolution_is_flat_between_changes() {
        let db = temp_db("flat");
        seed(&db, vec![(0, record(5)), (10, record(7)), (20, record(9))]);
        let store = ConfigStore::new(&db);

        for (lo, hi) in [(0u64, 9u64), (10, 19), (20, 40)] {
            let expected = store.effective_config(lo).unwrap();
            for t in lo..=hi {
                assert_eq!(store.effective_config(t).unwrap(), expected, "term {t}");
            }
        }
    }

    #[test]
    fn effective_entry_reports_scheduled_term() {
        let db = temp_db("entry");
        seed(&db, vec![(0, record(5)), (6, record(8))]);
        let store = ConfigStore::new(&db);

        assert_eq!(store.effective_entry(5).unwrap().0, 0);
        assert_eq!(store.effective_entry(6).unwrap().0, 6);
        assert_eq!(store.schedule().unwrap().len(), 2);
    }
}
