use arbitra_core::clock::TermClock;
use arbitra_core::config::ConfigRecord;
use arbitra_core::constants::DEFAULT_MIN_NOTICE_TERMS;
use arbitra_core::error::ArbitraError;
use arbitra_core::event::CourtEvent;
use arbitra_core::governance::Governance;
use arbitra_core::types::{AccountId, TermId};
use arbitra_state::db::META_MIN_NOTICE_TERMS;
use arbitra_state::{StagedWrites, StateDb};
use tracing::info;

use crate::store::ConfigStore;

/// Write side of the config schedule.
///
/// A change for term T is accepted only from the governor and only while
/// `T > current_term + min_notice_terms`, so every change is announced at
/// least `min_notice_terms` full terms before it can take effect.
pub struct ConfigScheduler<'a> {
    db: &'a StateDb,
    clock: &'a dyn TermClock,
    governance: &'a dyn Governance,
    min_notice_terms: u64,
}

impl<'a> ConfigScheduler<'a> {
    /// Build a scheduler using the notice period recorded at genesis,
    /// falling back to `DEFAULT_MIN_NOTICE_TERMS`.
    pub fn new(
        db: &'a StateDb,
        clock: &'a dyn TermClock,
        governance: &'a dyn Governance,
    ) -> Result<Self, ArbitraError> {
        let min_notice_terms = db
            .get_u64_meta(META_MIN_NOTICE_TERMS)?
            .unwrap_or(DEFAULT_MIN_NOTICE_TERMS);
        Ok(Self { db, clock, governance, min_notice_terms })
    }

    pub fn with_min_notice_terms(mut self, terms: u64) -> Self {
        self.min_notice_terms = terms;
        self
    }

    pub fn min_notice_terms(&self) -> u64 {
        self.min_notice_terms
    }

    /// Earliest term a change requested now may target. `None` once the
    /// notice period reaches past the last representable term.
    pub fn earliest_change_term(&self) -> Option<TermId> {
        self.clock
            .current_term()
            .checked_add(self.min_notice_terms)?
            .checked_add(1)
    }

    /// Schedule `new` to take effect from `change_term`.
    ///
    /// An existing entry at `change_term` is replaced; entries at other
    /// terms are untouched. Nothing is written unless every check passes.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the governor.
    /// - `TooOldTerm` if `change_term` does not leave the notice period.
    /// - `InvalidConfigValue` if `new` fails validation.
    pub fn schedule_change(
        &self,
        new: ConfigRecord,
        change_term: TermId,
        caller: &AccountId,
    ) -> Result<CourtEvent, ArbitraError> {
        if !self.governance.is_governor(caller) {
            return Err(ArbitraError::Unauthorized);
        }

        let earliest = self.earliest_change_term().ok_or(ArbitraError::TooOldTerm {
            requested: change_term,
            earliest: TermId::MAX,
        })?;
        if change_term < earliest {
            return Err(ArbitraError::TooOldTerm { requested: change_term, earliest });
        }

        new.validate()?;

        let previous = ConfigStore::new(self.db).effective_config(change_term)?;
        let event = CourtEvent::ConfigChangeScheduled {
            previous,
            new: new.clone(),
            from_term: change_term,
        };

        let staged = StagedWrites {
            configs: vec![(change_term, new)],
            events: vec![event.clone()],
            ..Default::default()
        };
        self.db.commit(&staged)?;

        info!(
            from_term = change_term,
            current_term = self.clock.current_term(),
            caller = %caller,
            "config change scheduled"
        );
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbitra_core::clock::ManualClock;
    use arbitra_core::governance::GovernorKey;

    fn temp_db(name: &str) -> StateDb {
        let dir = std::env::temp_dir().join(format!("arbitra_scheduler_test_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        let db = StateDb::open(&dir).expect("open temp db");
        db.commit(&StagedWrites {
            configs: vec![(0, ConfigRecord::default())],
            ..Default::default()
        })
        .unwrap();
        db
    }

    /// Default config with every fee and count scaled by `factor`.
    fn scaled(factor: u64) -> ConfigRecord {
        let mut c = ConfigRecord::default();
        let f = factor as u128;
        c.fees.juror_fee *= f;
        c.fees.heartbeat_fee *= f;
        c.fees.draft_fee *= f;
        c.fees.settle_fee *= f;
        c.terms.commit_terms *= factor;
        c.terms.reveal_terms *= factor;
        c.terms.appeal_terms *= factor;
        c.terms.appeal_confirm_terms *= factor;
        c.first_round_jurors *= factor;
        c.appeal_step_factor *= factor;
        c.appeal_collateral_factor *= factor;
        c.appeal_confirm_collateral_factor *= factor;
        c
    }

    fn governor() -> AccountId {
        AccountId::from_label("governor")
    }

    #[test]
    fn governor_schedules_two_terms_ahead() {
        let db = temp_db("two_ahead");
        let clock = ManualClock::new(1);
        let gov = GovernorKey(governor());
        let scheduler = ConfigScheduler::new(&db, &clock, &gov).unwrap();

        scheduler.schedule_change(scaled(2), 3, &governor()).unwrap();

        let store = ConfigStore::new(&db);
        assert_eq!(store.effective_config(2).unwrap(), ConfigRecord::default());
        assert_eq!(store.effective_config(3).unwrap(), scaled(2));
    }

    #[test]
    fn non_governor_rejected() {
        let db = temp_db("non_gov");
        let clock = ManualClock::new(1);
        let gov = GovernorKey(governor());
        let scheduler = ConfigScheduler::new(&db, &clock, &gov).unwrap();

        let err = scheduler
            .schedule_change(scaled(2), 3, &AccountId::from_label("mallory"))
            .unwrap_err();
        assert!(matches!(err, ArbitraError::Unauthorized));
        assert!(db.get_config(3).unwrap().is_none());
    }

    #[test]
    fn notice_period_enforced() {
        let db = temp_db("notice");
        let clock = ManualClock::new(5);
        let gov = GovernorKey(governor());
        let scheduler = ConfigScheduler::new(&db, &clock, &gov).unwrap();

        for term in [0, 4, 5, 6] {
            let err = scheduler.schedule_change(scaled(2), term, &governor()).unwrap_err();
            assert!(
                matches!(err, ArbitraError::TooOldTerm { earliest: 7, .. }),
                "term {term} should be too old"
            );
        }
        scheduler.schedule_change(scaled(2), 7, &governor()).unwrap();
        assert_eq!(db.config_schedule().unwrap().len(), 2);
    }

    #[test]
    fn change_in_the_past_rejected() {
        let db = temp_db("past");
        let clock = ManualClock::new(4);
        let gov = GovernorKey(governor());
        let scheduler = ConfigScheduler::new(&db, &clock, &gov).unwrap();

        let err = scheduler.schedule_change(scaled(2), 3, &governor()).unwrap_err();
        assert!(matches!(err, ArbitraError::TooOldTerm { requested: 3, .. }));
    }

    #[test]
    fn longer_notice_is_configurable() {
        let db = temp_db("long_notice");
        let clock = ManualClock::new(1);
        let gov = GovernorKey(governor());
        let scheduler = ConfigScheduler::new(&db, &clock, &gov)
            .unwrap()
            .with_min_notice_terms(5);

        assert!(scheduler.schedule_change(scaled(2), 6, &governor()).is_err());
        scheduler.schedule_change(scaled(2), 7, &governor()).unwrap();
    }

    #[test]
    fn notice_cannot_wrap_past_last_term() {
        let db = temp_db("last_term");
        let clock = ManualClock::new(u64::MAX - 1);
        let gov = GovernorKey(governor());
        let scheduler = ConfigScheduler::new(&db, &clock, &gov).unwrap();

        assert_eq!(scheduler.earliest_change_term(), None);
        let err = scheduler
            .schedule_change(scaled(2), u64::MAX, &governor())
            .unwrap_err();
        assert!(matches!(err, ArbitraError::TooOldTerm { requested: u64::MAX, .. }));
        assert!(db.get_config(u64::MAX).unwrap().is_none());

        // Without notice the last term is still strictly after the current one.
        let scheduler = scheduler.with_min_notice_terms(0);
        assert_eq!(scheduler.earliest_change_term(), Some(u64::MAX));
        scheduler.schedule_change(scaled(2), u64::MAX, &governor()).unwrap();
    }

    #[test]
    fn same_term_overwrites_without_touching_neighbours() {
        let db = temp_db("overwrite");
        let clock = ManualClock::new(1);
        let gov = GovernorKey(governor());
        let scheduler = ConfigScheduler::new(&db, &clock, &gov).unwrap();

        scheduler.schedule_change(scaled(2), 3, &governor()).unwrap();
        scheduler.schedule_change(scaled(3), 5, &governor()).unwrap();
        scheduler.schedule_change(scaled(4), 3, &governor()).unwrap();

        let schedule = db.config_schedule().unwrap();
        let terms: Vec<_> = schedule.iter().map(|(t, _)| *t).collect();
        assert_eq!(terms, vec![0, 3, 5]);

        let store = ConfigStore::new(&db);
        assert_eq!(store.effective_config(2).unwrap(), ConfigRecord::default());
        assert_eq!(store.effective_config(3).unwrap(), scaled(4));
        assert_eq!(store.effective_config(4).unwrap(), scaled(4));
        assert_eq!(store.effective_config(5).unwrap(), scaled(3));
    }

    #[test]
    fn invalid_config_writes_nothing() {
        let db = temp_db("invalid");
        let clock = ManualClock::new(1);
        let gov = GovernorKey(governor());
        let scheduler = ConfigScheduler::new(&db, &clock, &gov).unwrap();

        let mut bad = ConfigRecord::default();
        bad.first_round_jurors = 0;
        let err = scheduler.schedule_change(bad, 3, &governor()).unwrap_err();
        assert!(matches!(err, ArbitraError::InvalidConfigValue { .. }));
        assert!(db.get_config(3).unwrap().is_none());
        assert!(db.events_since(0).unwrap().is_empty());
    }

    #[test]
    fn event_carries_previous_record() {
        let db = temp_db("event");
        let clock = ManualClock::new(1);
        let gov = GovernorKey(governor());
        let scheduler = ConfigScheduler::new(&db, &clock, &gov).unwrap();

        scheduler.schedule_change(scaled(2), 3, &governor()).unwrap();
        let event = scheduler.schedule_change(scaled(3), 3, &governor()).unwrap();

        assert_eq!(
            event,
            CourtEvent::ConfigChangeScheduled {
                previous: scaled(2),
                new: scaled(3),
                from_term: 3,
            }
        );
        assert_eq!(db.events_since(0).unwrap().len(), 2);
    }
}
