use arbitra_core::config::ConfigRecord;
use arbitra_core::error::ArbitraError;
use arbitra_core::types::TermId;
use arbitra_state::StateDb;

use crate::store::ConfigStore;

/// Query helpers over the config schedule.
pub struct ConfigQuery<'a> {
    db: &'a StateDb,
}

impl<'a> ConfigQuery<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self { db }
    }

    /// Changes scheduled strictly after `current_term`, in term order.
    pub fn pending_changes(
        &self,
        current_term: TermId,
    ) -> Result<Vec<(TermId, ConfigRecord)>, ArbitraError> {
        Ok(ConfigStore::new(self.db)
            .schedule()?
            .into_iter()
            .filter(|(term, _)| *term > current_term)
            .collect())
    }

    /// Human-readable summary of the config in effect at `term`.
    pub fn describe(&self, term: TermId) -> Result<String, ArbitraError> {
        let (since, c) = ConfigStore::new(self.db).effective_entry(term)?;
        Ok(format!(
            "Config @ term {} (scheduled at term {}) | token {} | \
             fees: juror {} heartbeat {} draft {} settle {} | \
             terms: commit {} reveal {} appeal {} confirm {} | \
             penalty {}bp final-reduction {}bp | \
             jurors {} ×{} up to {} regular appeals | collateral ×{} / ×{}",
            term,
            since,
            c.fee_token,
            c.fees.juror_fee,
            c.fees.heartbeat_fee,
            c.fees.draft_fee,
            c.fees.settle_fee,
            c.terms.commit_terms,
            c.terms.reveal_terms,
            c.terms.appeal_terms,
            c.terms.appeal_confirm_terms,
            c.penalty_pct,
            c.final_round_reduction,
            c.first_round_jurors,
            c.appeal_step_factor,
            c.max_regular_appeal_rounds,
            c.appeal_collateral_factor,
            c.appeal_confirm_collateral_factor,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbitra_state::StagedWrites;

    #[test]
    fn pending_changes_excludes_past_and_current() {
        let dir = std::env::temp_dir().join("arbitra_config_query_pending");
        let _ = std::fs::remove_dir_all(&dir);
        let db = StateDb::open(&dir).unwrap();
        let c = ConfigRecord::default();
        db.commit(&StagedWrites {
            configs: vec![(0, c.clone()), (3, c.clone()), (8, c.clone())],
            ..Default::default()
        })
        .unwrap();

        let q = ConfigQuery::new(&db);
        let pending: Vec<_> = q.pending_changes(3).unwrap().into_iter().map(|(t, _)| t).collect();
        assert_eq!(pending, vec![8]);
        assert!(q.describe(5).unwrap().contains("scheduled at term 3"));
    }
}
