use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use super::domain::{ConcernTracking, TrackingState};
use crate::workflows::routine::RoutineItemId;

/// A recorded effectiveness verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingEntry {
    pub routine_item_id: RoutineItemId,
    pub concern_name: String,
    pub is_effective: bool,
    pub rated_at: DateTime<Utc>,
    pub cycle: u32,
}

/// Result of a successful [`EffectivenessLedger::rate`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingOutcome {
    pub entry: RatingEntry,
    pub previous: Option<bool>,
}

impl RatingOutcome {
    pub fn changed(&self) -> bool {
        self.previous != Some(self.entry.is_effective)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatingError {
    #[error("tracking for {concern} is not complete yet ({weeks_completed}/{total_weeks} weeks)")]
    NotCompleted {
        concern: String,
        weeks_completed: u32,
        total_weeks: u32,
    },
    #[error("tracking for {concern} was paused; refresh and try again")]
    StaleState { concern: String },
    #[error("{concern} is not tracked for this routine item")]
    UnknownConcern { concern: String },
}

type LedgerKey = (RoutineItemId, String);

/// Current effectiveness verdict per (routine item, concern), plus the verdicts
/// they replaced.
#[derive(Debug, Clone, Default)]
pub struct EffectivenessLedger {
    current: HashMap<LedgerKey, RatingEntry>,
    history: Vec<RatingEntry>,
}

impl EffectivenessLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a verdict for a completed cycle.
    ///
    /// Re-rating with the same verdict only moves `rated_at`; a different verdict
    /// replaces the current entry and moves the old one to history. Nothing is
    /// written when the precondition fails.
    pub fn rate(
        &mut self,
        item_id: &RoutineItemId,
        tracking: &ConcernTracking,
        is_effective: bool,
        rated_at: DateTime<Utc>,
    ) -> Result<RatingOutcome, RatingError> {
        ensure_rateable(tracking)?;

        let key = (item_id.clone(), tracking.concern_name().to_string());
        let entry = RatingEntry {
            routine_item_id: item_id.clone(),
            concern_name: tracking.concern_name().to_string(),
            is_effective,
            rated_at,
            cycle: tracking.cycle(),
        };

        let previous = match self.current.insert(key, entry.clone()) {
            Some(prior) if prior.cycle == entry.cycle && prior.is_effective == is_effective => {
                Some(prior.is_effective)
            }
            Some(prior) if prior.cycle == entry.cycle => {
                let verdict = prior.is_effective;
                self.history.push(prior);
                Some(verdict)
            }
            Some(prior) => {
                self.history.push(prior);
                None
            }
            None => None,
        };

        Ok(RatingOutcome { entry, previous })
    }

    pub fn current_rating(&self, item_id: &RoutineItemId, concern: &str) -> Option<bool> {
        self.current_entry(item_id, concern)
            .map(|entry| entry.is_effective)
    }

    pub fn current_entry(&self, item_id: &RoutineItemId, concern: &str) -> Option<&RatingEntry> {
        self.current.get(&(item_id.clone(), concern.to_string()))
    }

    /// Superseded and archived verdicts, oldest first.
    pub fn history(&self, item_id: &RoutineItemId, concern: &str) -> Vec<&RatingEntry> {
        self.history
            .iter()
            .filter(|entry| &entry.routine_item_id == item_id && entry.concern_name == concern)
            .collect()
    }

    /// Close the current verdict when a new cycle opens. The entry is kept in
    /// history.
    pub fn archive(&mut self, item_id: &RoutineItemId, concern: &str) -> Option<RatingEntry> {
        let entry = self.current.remove(&(item_id.clone(), concern.to_string()))?;
        self.history.push(entry.clone());
        Some(entry)
    }

    /// Drop every verdict for a concern that is no longer tracked.
    pub fn forget(&mut self, item_id: &RoutineItemId, concern: &str) {
        self.current.remove(&(item_id.clone(), concern.to_string()));
        self.history
            .retain(|entry| !(&entry.routine_item_id == item_id && entry.concern_name == concern));
    }
}

/// Rating precondition, evaluated against freshly refreshed state.
pub(crate) fn ensure_rateable(tracking: &ConcernTracking) -> Result<(), RatingError> {
    if !tracking.is_completed() {
        return Err(RatingError::NotCompleted {
            concern: tracking.concern_name().to_string(),
            weeks_completed: tracking.weeks_completed(),
            total_weeks: tracking.total_weeks(),
        });
    }
    if tracking.state() == TrackingState::Paused {
        return Err(RatingError::StaleState {
            concern: tracking.concern_name().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::tracking::progress::compute_progress;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn item_id() -> RoutineItemId {
        RoutineItemId("item-7".to_string())
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn tracking(concern: &str, days_ago: i64) -> ConcernTracking {
        let today = NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid");
        let start = today - Duration::days(days_ago);
        let mut tracking = ConcernTracking::new(concern, 28, start);
        tracking.apply_progress(compute_progress(start, 28, today));
        tracking
    }

    #[test]
    fn rejects_incomplete_cycle_without_writing() {
        let mut ledger = EffectivenessLedger::new();
        let acne = tracking("acne", 10);

        let error = ledger
            .rate(&item_id(), &acne, true, at(9))
            .expect_err("incomplete cycle");

        assert_eq!(
            error,
            RatingError::NotCompleted {
                concern: "acne".to_string(),
                weeks_completed: 1,
                total_weeks: 4,
            }
        );
        assert_eq!(ledger.current_rating(&item_id(), "acne"), None);
    }

    #[test]
    fn same_verdict_twice_only_moves_timestamp() {
        let mut ledger = EffectivenessLedger::new();
        let redness = tracking("redness", 28);

        let first = ledger.rate(&item_id(), &redness, true, at(9)).expect("rated");
        let second = ledger.rate(&item_id(), &redness, true, at(10)).expect("rated");

        assert!(first.changed());
        assert!(!second.changed());
        assert_eq!(ledger.current_rating(&item_id(), "redness"), Some(true));
        assert_eq!(
            ledger
                .current_entry(&item_id(), "redness")
                .map(|entry| entry.rated_at),
            Some(at(10))
        );
        assert!(ledger.history(&item_id(), "redness").is_empty());
    }

    #[test]
    fn opposite_verdict_replaces_and_keeps_history() {
        let mut ledger = EffectivenessLedger::new();
        let redness = tracking("redness", 35);

        ledger.rate(&item_id(), &redness, false, at(9)).expect("rated");
        let outcome = ledger.rate(&item_id(), &redness, true, at(10)).expect("rated");

        assert_eq!(outcome.previous, Some(false));
        assert_eq!(ledger.current_rating(&item_id(), "redness"), Some(true));
        let history = ledger.history(&item_id(), "redness");
        assert_eq!(history.len(), 1);
        assert!(!history[0].is_effective);
    }

    #[test]
    fn archive_clears_current_but_keeps_history() {
        let mut ledger = EffectivenessLedger::new();
        let redness = tracking("redness", 28);
        ledger.rate(&item_id(), &redness, true, at(9)).expect("rated");

        let archived = ledger.archive(&item_id(), "redness").expect("archived");

        assert!(archived.is_effective);
        assert_eq!(ledger.current_rating(&item_id(), "redness"), None);
        assert_eq!(ledger.history(&item_id(), "redness").len(), 1);

        ledger.forget(&item_id(), "redness");
        assert!(ledger.history(&item_id(), "redness").is_empty());
    }

    #[test]
    fn paused_completed_cycle_is_stale() {
        let mut ledger = EffectivenessLedger::new();
        let mut redness = tracking("redness", 28);
        redness.state = TrackingState::Paused;

        let error = ledger
            .rate(&item_id(), &redness, true, at(9))
            .expect_err("paused");
        assert!(matches!(error, RatingError::StaleState { .. }));
    }
}
