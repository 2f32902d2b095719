use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ArbitraError;
use crate::types::TermId;

/// Source of the court's current term. The clock is the only authority that
/// advances time; the court only reads it.
pub trait TermClock {
    fn current_term(&self) -> TermId;
}

/// A clock advanced explicitly by its owner. Used by the operator binary,
/// which persists the term between runs, and by tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    term: AtomicU64,
}

impl ManualClock {
    pub fn new(term: TermId) -> Self {
        Self {
            term: AtomicU64::new(term),
        }
    }

    /// Move the clock to `term`. Fails if that would move time backwards.
    pub fn set_term(&self, term: TermId) -> Result<(), ArbitraError> {
        let current = self.term.load(Ordering::SeqCst);
        if term < current {
            return Err(ArbitraError::TermRegression {
                current,
                requested: term,
            });
        }
        self.term.store(term, Ordering::SeqCst);
        Ok(())
    }

    pub fn advance(&self, terms: u64) {
        self.term.fetch_add(terms, Ordering::SeqCst);
    }
}

impl TermClock for ManualClock {
    fn current_term(&self) -> TermId {
        self.term.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_moves_forward() {
        let clock = ManualClock::new(1);
        clock.set_term(4).unwrap();
        clock.advance(2);
        assert_eq!(clock.current_term(), 6);
    }

    #[test]
    fn clock_never_moves_backwards() {
        let clock = ManualClock::new(5);
        let err = clock.set_term(4).unwrap_err();
        assert!(matches!(err, ArbitraError::TermRegression { current: 5, requested: 4 }));
        assert_eq!(clock.current_term(), 5);
    }
}
