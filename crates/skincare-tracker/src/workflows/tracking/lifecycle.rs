use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

use super::domain::{
    ConcernTracking, RatingRequest, ReviewOutcome, ScoreUpdate, TrackingState, UsageConsistency,
    UsageReview,
};
use super::ledger::{ensure_rateable, EffectivenessLedger, RatingError, RatingOutcome};
use super::progress::{compute_progress, effective_now};
use crate::workflows::concerns;
use crate::workflows::routine::{RoutineItem, RoutineItemId};

impl ConcernTracking {
    /// Recompute weeks for `today` and advance the state machine.
    ///
    /// Paused records keep counting against their pause date, so their progress
    /// never moves.
    pub fn refresh(&mut self, today: NaiveDate) {
        let now = effective_now(today, self.paused_on);
        let progress = compute_progress(self.cycle_start, self.required_days, now);
        self.apply_progress(progress);

        self.state = match self.state {
            TrackingState::Paused => TrackingState::Paused,
            TrackingState::Rated if progress.is_completed => TrackingState::Rated,
            _ if progress.is_completed => TrackingState::Completed,
            _ => TrackingState::Active,
        };
        self.is_active = self.state != TrackingState::Paused;
    }

    /// Apply new analysis scores. Ignored once paused.
    pub fn update_scores(&mut self, baseline: Option<f64>, current: Option<f64>) -> bool {
        if self.state == TrackingState::Paused {
            return false;
        }
        self.apply_scores(baseline, current);
        true
    }

    /// Stop tracking on `on`. Returns `false` when already paused.
    pub fn pause(&mut self, on: NaiveDate) -> bool {
        if self.state == TrackingState::Paused {
            return false;
        }
        let frozen = compute_progress(self.cycle_start, self.required_days, on);
        self.apply_progress(frozen);
        self.paused_on = Some(on);
        self.state = TrackingState::Paused;
        self.is_active = false;
        true
    }

    /// Open the next cycle. Scores and the verdict belong to the previous cycle
    /// and are cleared.
    pub fn begin_cycle(&mut self, start: NaiveDate, required_days: u32) {
        self.cycle += 1;
        self.cycle_start = start;
        self.required_days = required_days;
        self.paused_on = None;
        self.effectiveness_rating = None;
        self.state = TrackingState::Active;
        self.is_active = true;
        self.apply_scores(None, None);
        self.apply_progress(compute_progress(start, required_days, start));
    }

    pub(crate) fn record_rating(&mut self, is_effective: bool) {
        self.effectiveness_rating = Some(is_effective);
        self.state = TrackingState::Rated;
    }
}

/// A routine item with its per-concern tracking records and rating ledger.
///
/// Every state transition for an item goes through here.
#[derive(Debug, Clone)]
pub struct TrackedRoutine {
    item: RoutineItem,
    concerns: BTreeMap<String, ConcernTracking>,
    ledger: EffectivenessLedger,
}

impl TrackedRoutine {
    /// Start tracking every concern on a freshly saved item.
    pub fn start(item: RoutineItem, today: NaiveDate) -> Self {
        let concerns = item
            .concerns
            .iter()
            .map(|concern| {
                (
                    concern.clone(),
                    ConcernTracking::new(concern.clone(), item.required_days, item.anchor_date()),
                )
            })
            .collect();

        let mut tracked = Self {
            item,
            concerns,
            ledger: EffectivenessLedger::new(),
        };
        tracked.refresh(today);
        tracked
    }

    pub fn id(&self) -> &RoutineItemId {
        &self.item.id
    }

    pub fn item(&self) -> &RoutineItem {
        &self.item
    }

    pub fn ledger(&self) -> &EffectivenessLedger {
        &self.ledger
    }

    pub fn concerns(&self) -> impl Iterator<Item = &ConcernTracking> {
        self.concerns.values()
    }

    pub fn concern(&self, name: &str) -> Option<&ConcernTracking> {
        self.concerns.get(&concerns::canonical_token(name))
    }

    pub fn current_rating(&self, concern: &str) -> Option<bool> {
        self.ledger
            .current_rating(&self.item.id, &concerns::canonical_token(concern))
    }

    /// Advance every concern to `today`. An end date that has been reached
    /// pauses everything at that date.
    pub fn refresh(&mut self, today: NaiveDate) {
        if let Some(end) = self.item.end_date.filter(|end| *end <= today) {
            for tracking in self.concerns.values_mut() {
                tracking.pause(end);
            }
        }
        for tracking in self.concerns.values_mut() {
            tracking.refresh(today);
        }
    }

    /// Apply a batch of analysis scores. Unknown concerns reject the whole batch.
    pub fn apply_scores(
        &mut self,
        updates: &[ScoreUpdate],
        today: NaiveDate,
    ) -> Result<usize, RatingError> {
        let keyed = updates
            .iter()
            .map(|update| {
                let key = concerns::canonical_token(&update.concern_name);
                if self.concerns.contains_key(&key) {
                    Ok((key, update))
                } else {
                    Err(RatingError::UnknownConcern {
                        concern: update.concern_name.clone(),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.refresh(today);
        let mut applied = 0;
        for (key, update) in keyed {
            if let Some(tracking) = self.concerns.get_mut(&key) {
                if tracking.update_scores(update.baseline_score, update.current_score) {
                    applied += 1;
                }
            }
        }
        Ok(applied)
    }

    /// Rate a single concern.
    pub fn rate(
        &mut self,
        concern: &str,
        is_effective: bool,
        rated_at: DateTime<Utc>,
    ) -> Result<RatingOutcome, RatingError> {
        self.rate_all(
            &[RatingRequest {
                concern_name: concern.to_string(),
                is_effective,
            }],
            rated_at,
        )
        .and_then(|outcomes| {
            outcomes
                .into_iter()
                .next()
                .ok_or_else(|| RatingError::UnknownConcern {
                    concern: concern.to_string(),
                })
        })
    }

    /// Rate several concerns at once. Every precondition is checked before any
    /// verdict is written, so a rejected batch leaves no trace.
    pub fn rate_all(
        &mut self,
        ratings: &[RatingRequest],
        rated_at: DateTime<Utc>,
    ) -> Result<Vec<RatingOutcome>, RatingError> {
        let mut keyed = Vec::with_capacity(ratings.len());
        for rating in ratings {
            let key = concerns::canonical_token(&rating.concern_name);
            let tracking =
                self.concerns
                    .get(&key)
                    .ok_or_else(|| RatingError::UnknownConcern {
                        concern: rating.concern_name.clone(),
                    })?;
            ensure_rateable(tracking)?;
            keyed.push((key, rating.is_effective));
        }

        let mut outcomes = Vec::with_capacity(keyed.len());
        for (key, is_effective) in keyed {
            let Some(tracking) = self.concerns.get_mut(&key) else {
                continue;
            };
            let outcome = self
                .ledger
                .rate(&self.item.id, tracking, is_effective, rated_at)?;
            tracking.record_rating(is_effective);
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Pause the named concerns, or all of them. Already paused concerns are
    /// skipped. Returns the concerns that changed.
    pub fn pause(&mut self, selection: Option<&[String]>, on: NaiveDate) -> Vec<String> {
        let selected: Option<Vec<String>> = selection.map(|names| {
            names
                .iter()
                .map(|name| concerns::canonical_token(name))
                .collect()
        });

        self.concerns
            .values_mut()
            .filter(|tracking| match &selected {
                Some(names) => names.iter().any(|name| name == tracking.concern_name()),
                None => true,
            })
            .filter_map(|tracking| {
                tracking
                    .pause(on)
                    .then(|| tracking.concern_name().to_string())
            })
            .collect()
    }

    /// Resume a stopped item: opens a new cycle, starting `on`, for every paused
    /// concern. Returns the concerns that restarted; nothing changes when none
    /// was paused.
    ///
    /// An end date that has already been reached is cleared so the new cycles
    /// are not paused again on the next refresh. A future end date is kept.
    pub fn resume(&mut self, on: NaiveDate) -> Vec<String> {
        let mut resumed = Vec::new();
        for tracking in self.concerns.values_mut() {
            if tracking.state() != TrackingState::Paused {
                continue;
            }
            self.ledger.archive(&self.item.id, tracking.concern_name());
            tracking.begin_cycle(on, self.item.required_days);
            tracking.refresh(on);
            resumed.push(tracking.concern_name().to_string());
        }

        if !resumed.is_empty() && self.item.end_date.is_some_and(|end| end <= on) {
            self.item.end_date = None;
        }
        resumed
    }

    /// Handle the usage-consistency prompt. The stop affordance shows for a
    /// `No` answer; tracking only stops once the user confirms.
    pub fn review_usage(&mut self, review: &UsageReview, on: NaiveDate) -> ReviewOutcome {
        let show_stop_tracking = review.response == Some(UsageConsistency::No);
        let paused = if show_stop_tracking && review.confirm_stop {
            self.pause(review.concerns.as_deref(), on)
        } else {
            Vec::new()
        };

        ReviewOutcome {
            show_stop_tracking,
            paused,
        }
    }

    /// Replace the item with an edited version and reconcile its concerns.
    ///
    /// A new anchor date or tracking window restarts every cycle; removed
    /// concerns lose their records and verdicts; added concerns start fresh.
    /// Clearing a reached end date resumes tracking from `today`.
    pub fn apply_edit(&mut self, updated: RoutineItem, today: NaiveDate) {
        let restart = updated.anchor_date() != self.item.anchor_date()
            || updated.required_days != self.item.required_days;
        let reopened = self.item.end_date.is_some() && updated.end_date.is_none();

        let removed: Vec<String> = self
            .concerns
            .keys()
            .filter(|concern| !updated.concerns.contains(*concern))
            .cloned()
            .collect();
        for concern in removed {
            self.concerns.remove(&concern);
            self.ledger.forget(&self.item.id, &concern);
        }

        for concern in &updated.concerns {
            self.concerns.entry(concern.clone()).or_insert_with(|| {
                ConcernTracking::new(concern.clone(), updated.required_days, updated.anchor_date())
            });
        }

        self.item = updated;

        if restart {
            for tracking in self.concerns.values_mut() {
                self.ledger.archive(&self.item.id, tracking.concern_name());
                tracking.begin_cycle(self.item.anchor_date(), self.item.required_days);
            }
        }

        if reopened {
            self.resume(today);
        }

        self.refresh(today);
    }
}
