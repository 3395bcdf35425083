use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use super::domain::{RatingRequest, ReviewOutcome, ScoreUpdate, TrackingAction, UsageReview};
use super::ledger::{RatingError, RatingOutcome};
use super::lifecycle::TrackedRoutine;
use super::repository::{RepositoryError, RoutineRepository};
use crate::config::TrackingConfig;
use crate::workflows::routine::{RoutineItemDraft, RoutineItemId, RoutineItemPatch, ValidationError};

/// Routine service facade: validates input and runs each lifecycle transition
/// on the stored record as a single repository write.
pub struct RoutineTrackingService<R> {
    repository: Arc<R>,
    config: TrackingConfig,
}

static ROUTINE_ITEM_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_routine_item_id() -> RoutineItemId {
    let id = ROUTINE_ITEM_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RoutineItemId(format!("item-{id:06}"))
}

impl<R> RoutineTrackingService<R>
where
    R: RoutineRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: TrackingConfig) -> Self {
        Self { repository, config }
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Validate and save a new item, starting a tracking record per concern.
    pub fn create_item(
        &self,
        draft: RoutineItemDraft,
        today: NaiveDate,
    ) -> Result<TrackedRoutine, TrackingServiceError> {
        let item = draft.validate(
            next_routine_item_id(),
            self.config.default_required_days,
            today,
        )?;
        let tracked = TrackedRoutine::start(item, today);
        let stored = self.repository.insert(tracked)?;

        info!(
            item_id = %stored.id(),
            concerns = stored.item().concerns.len(),
            "routine item created"
        );
        Ok(stored)
    }

    /// `getConcernTracking`: the item's records advanced to `today`.
    ///
    /// Read only. The refresh is derived from the stored dates, so it is
    /// recomputed on every read instead of being written back.
    pub fn concern_tracking(
        &self,
        id: &RoutineItemId,
        today: NaiveDate,
    ) -> Result<TrackedRoutine, TrackingServiceError> {
        let mut tracked = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        tracked.refresh(today);
        Ok(tracked)
    }

    /// `rateEffectiveness`: the completion precondition is checked against the
    /// stored state inside the write, never against what a screen last displayed.
    pub fn rate_effectiveness(
        &self,
        id: &RoutineItemId,
        ratings: &[RatingRequest],
        today: NaiveDate,
        rated_at: DateTime<Utc>,
    ) -> Result<Vec<RatingOutcome>, TrackingServiceError> {
        let outcomes = self.modify_fresh(id, today, |tracked| {
            tracked.rate_all(ratings, rated_at).map_err(|error| {
                warn!(item_id = %id, %error, "rating rejected");
                TrackingServiceError::from(error)
            })
        })?;

        for outcome in &outcomes {
            info!(
                item_id = %id,
                concern = %outcome.entry.concern_name,
                is_effective = outcome.entry.is_effective,
                changed = outcome.changed(),
                "effectiveness rating recorded"
            );
        }
        Ok(outcomes)
    }

    /// `toggleTracking`: returns the concerns whose state changed.
    pub fn toggle_tracking(
        &self,
        id: &RoutineItemId,
        action: TrackingAction,
        today: NaiveDate,
    ) -> Result<Vec<String>, TrackingServiceError> {
        let changed = self.modify_fresh(id, today, |tracked| {
            Ok(match action {
                TrackingAction::Pause => tracked.pause(None, today),
                TrackingAction::Resume => tracked.resume(today),
            })
        })?;

        info!(item_id = %id, ?action, changed = changed.len(), "tracking toggled");
        Ok(changed)
    }

    pub fn review_usage(
        &self,
        id: &RoutineItemId,
        review: &UsageReview,
        today: NaiveDate,
    ) -> Result<ReviewOutcome, TrackingServiceError> {
        let outcome =
            self.modify_fresh(id, today, |tracked| Ok(tracked.review_usage(review, today)))?;
        if !outcome.paused.is_empty() {
            info!(item_id = %id, paused = ?outcome.paused, "tracking stopped after usage review");
        }
        Ok(outcome)
    }

    /// `updateRoutineItem`: re-validates the whole item with the patch applied.
    pub fn update_item(
        &self,
        id: &RoutineItemId,
        patch: RoutineItemPatch,
        today: NaiveDate,
    ) -> Result<TrackedRoutine, TrackingServiceError> {
        let default_required_days = self.config.default_required_days;
        let tracked = self.modify_fresh(id, today, |tracked| {
            let mut draft = RoutineItemDraft::from_item(tracked.item());
            patch.apply_to(&mut draft);
            let updated = draft.validate(id.clone(), default_required_days, today)?;
            tracked.apply_edit(updated, today);
            Ok(tracked.clone())
        })?;

        info!(item_id = %id, "routine item updated");
        Ok(tracked)
    }

    pub fn delete_item(&self, id: &RoutineItemId) -> Result<(), TrackingServiceError> {
        self.repository.delete(id)?;
        info!(item_id = %id, "routine item deleted");
        Ok(())
    }

    /// Apply scores delivered by the analysis provider.
    pub fn record_scores(
        &self,
        id: &RoutineItemId,
        updates: &[ScoreUpdate],
        today: NaiveDate,
    ) -> Result<TrackedRoutine, TrackingServiceError> {
        let (applied, tracked) = self.modify_fresh(id, today, |tracked| {
            let applied = tracked.apply_scores(updates, today)?;
            Ok((applied, tracked.clone()))
        })?;

        info!(item_id = %id, applied, "analysis scores applied");
        Ok(tracked)
    }

    /// Advance the stored record to `today`, then apply `change` to it as one
    /// repository write. Nothing is saved when `change` fails.
    fn modify_fresh<T, F>(
        &self,
        id: &RoutineItemId,
        today: NaiveDate,
        change: F,
    ) -> Result<T, TrackingServiceError>
    where
        F: FnOnce(&mut TrackedRoutine) -> Result<T, TrackingServiceError>,
    {
        self.repository.modify(id, |tracked| {
            tracked.refresh(today);
            change(tracked)
        })
    }
}

/// Error raised by the routine tracking service.
#[derive(Debug, thiserror::Error)]
pub enum TrackingServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Rating(#[from] RatingError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
