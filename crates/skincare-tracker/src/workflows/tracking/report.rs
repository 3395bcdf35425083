use chrono::NaiveDate;
use serde::Serialize;

use super::comparison::ImprovementStatus;
use super::domain::{ConcernTracking, NextAction, TrackingState};
use super::lifecycle::TrackedRoutine;
use crate::workflows::concerns;
use crate::workflows::routine::{RoutineItemId, RoutineItemKind};

#[derive(Debug, Clone, Serialize)]
pub struct ConcernTrackingView {
    pub concern_name: String,
    pub concern_label: String,
    pub required_days: u32,
    pub weeks_completed: u32,
    pub total_weeks: u32,
    pub percent: u8,
    pub is_completed: bool,
    pub is_active: bool,
    pub baseline_score: Option<f64>,
    pub current_score: Option<f64>,
    pub score_difference: Option<f64>,
    pub improvement_status: ImprovementStatus,
    pub improvement_label: &'static str,
    pub effectiveness_rating: Option<bool>,
    pub state: TrackingState,
    pub state_label: &'static str,
    pub next_action: NextAction,
    pub next_action_label: &'static str,
    pub cycle: u32,
    pub cycle_start: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused_on: Option<NaiveDate>,
}

impl ConcernTracking {
    pub fn to_view(&self) -> ConcernTrackingView {
        let next_action = self.next_action();
        ConcernTrackingView {
            concern_name: self.concern_name().to_string(),
            concern_label: concerns::concern_label(self.concern_name()),
            required_days: self.required_days(),
            weeks_completed: self.weeks_completed(),
            total_weeks: self.total_weeks(),
            percent: self.percent(),
            is_completed: self.is_completed(),
            is_active: self.is_active(),
            baseline_score: self.baseline_score(),
            current_score: self.current_score(),
            score_difference: self.score_difference(),
            improvement_status: self.improvement_status(),
            improvement_label: self.improvement_status().label(),
            effectiveness_rating: self.effectiveness_rating(),
            state: self.state(),
            state_label: self.state().label(),
            next_action,
            next_action_label: next_action.label(),
            cycle: self.cycle(),
            cycle_start: self.cycle_start(),
            paused_on: self.paused_on(),
        }
    }
}

/// Per-item rollup shown on the routine detail screen and in CLI reports.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingReport {
    pub routine_item_id: RoutineItemId,
    pub item_name: String,
    pub kind: RoutineItemKind,
    pub kind_label: &'static str,
    pub total: usize,
    pub completed: usize,
    pub awaiting_rating: usize,
    pub awaiting_photo: usize,
    pub improved: usize,
    pub worsened: usize,
    pub paused: usize,
    pub average_percent: u8,
    pub concerns: Vec<ConcernTrackingView>,
}

impl TrackedRoutine {
    pub fn concern_views(&self) -> Vec<ConcernTrackingView> {
        self.concerns().map(ConcernTracking::to_view).collect()
    }

    pub fn report(&self) -> TrackingReport {
        let concerns = self.concern_views();
        let count = |predicate: &dyn Fn(&ConcernTrackingView) -> bool| {
            concerns.iter().filter(|view| predicate(view)).count()
        };

        let total = concerns.len();
        let completed = count(&|view| view.is_completed);
        let awaiting_rating = count(&|view| view.next_action == NextAction::Rate);
        let awaiting_photo = count(&|view| view.next_action == NextAction::TakePhoto);
        let improved = count(&|view| view.improvement_status == ImprovementStatus::Improved);
        let worsened = count(&|view| view.improvement_status == ImprovementStatus::Worsened);
        let paused = count(&|view| view.state == TrackingState::Paused);

        let average_percent = if total == 0 {
            0
        } else {
            let sum: u32 = concerns.iter().map(|view| u32::from(view.percent)).sum();
            (f64::from(sum) / total as f64).round().clamp(0.0, 100.0) as u8
        };

        let item = self.item();
        TrackingReport {
            routine_item_id: item.id.clone(),
            item_name: item.name.clone(),
            kind: item.kind,
            kind_label: item.kind.label(),
            total,
            completed,
            awaiting_rating,
            awaiting_photo,
            improved,
            worsened,
            paused,
            average_percent,
            concerns,
        }
    }
}
