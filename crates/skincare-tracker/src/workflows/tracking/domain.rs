use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::comparison::{compare, ImprovementStatus, ScoreComparison};
use super::progress::CycleProgress;

/// Lifecycle of one (routine item, concern) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingState {
    Active,
    Completed,
    Rated,
    Paused,
}

impl TrackingState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Tracking",
            Self::Completed => "Ready to Rate",
            Self::Rated => "Rated",
            Self::Paused => "Paused",
        }
    }
}

/// What the host should offer for a concern. Display only; `TakePhoto` is a
/// completed cycle that has no scores yet, not a separate lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    KeepTracking,
    TakePhoto,
    Rate,
    Rated,
    Paused,
}

impl NextAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::KeepTracking => "Keep using it and check back weekly",
            Self::TakePhoto => "Take a photo to see your results",
            Self::Rate => "Did it work? Rate it",
            Self::Rated => "Rated",
            Self::Paused => "Tracking paused",
        }
    }
}

/// Tracking record for one concern of one routine item.
///
/// Derived fields (`is_completed`, `score_difference`, `improvement_status`) are
/// only written through the lifecycle methods so they never drift from their
/// inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcernTracking {
    pub(crate) concern_name: String,
    pub(crate) required_days: u32,
    pub(crate) weeks_completed: u32,
    pub(crate) total_weeks: u32,
    pub(crate) percent: u8,
    pub(crate) is_completed: bool,
    pub(crate) is_active: bool,
    pub(crate) baseline_score: Option<f64>,
    pub(crate) current_score: Option<f64>,
    pub(crate) score_difference: Option<f64>,
    pub(crate) improvement_status: ImprovementStatus,
    pub(crate) effectiveness_rating: Option<bool>,
    pub(crate) state: TrackingState,
    pub(crate) cycle: u32,
    pub(crate) cycle_start: NaiveDate,
    pub(crate) paused_on: Option<NaiveDate>,
}

impl ConcernTracking {
    pub fn new(concern_name: impl Into<String>, required_days: u32, cycle_start: NaiveDate) -> Self {
        Self {
            concern_name: concern_name.into(),
            required_days,
            weeks_completed: 0,
            total_weeks: required_days.div_ceil(7),
            percent: 0,
            is_completed: false,
            is_active: true,
            baseline_score: None,
            current_score: None,
            score_difference: None,
            improvement_status: ImprovementStatus::InsufficientData,
            effectiveness_rating: None,
            state: TrackingState::Active,
            cycle: 1,
            cycle_start,
            paused_on: None,
        }
    }

    pub fn concern_name(&self) -> &str {
        &self.concern_name
    }

    pub fn required_days(&self) -> u32 {
        self.required_days
    }

    pub fn weeks_completed(&self) -> u32 {
        self.weeks_completed
    }

    pub fn total_weeks(&self) -> u32 {
        self.total_weeks
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn baseline_score(&self) -> Option<f64> {
        self.baseline_score
    }

    pub fn current_score(&self) -> Option<f64> {
        self.current_score
    }

    pub fn score_difference(&self) -> Option<f64> {
        self.score_difference
    }

    pub fn improvement_status(&self) -> ImprovementStatus {
        self.improvement_status
    }

    pub fn effectiveness_rating(&self) -> Option<bool> {
        self.effectiveness_rating
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn cycle_start(&self) -> NaiveDate {
        self.cycle_start
    }

    pub fn paused_on(&self) -> Option<NaiveDate> {
        self.paused_on
    }

    pub fn progress(&self) -> CycleProgress {
        CycleProgress {
            weeks_completed: self.weeks_completed,
            total_weeks: self.total_weeks,
            is_completed: self.is_completed,
            percent: self.percent,
        }
    }

    pub fn comparison(&self) -> ScoreComparison {
        ScoreComparison {
            difference: self.score_difference,
            status: self.improvement_status,
        }
    }

    pub fn next_action(&self) -> NextAction {
        match self.state {
            TrackingState::Paused => NextAction::Paused,
            TrackingState::Rated => NextAction::Rated,
            TrackingState::Completed
                if self.baseline_score.is_none() && self.current_score.is_none() =>
            {
                NextAction::TakePhoto
            }
            TrackingState::Completed => NextAction::Rate,
            TrackingState::Active => NextAction::KeepTracking,
        }
    }

    pub(crate) fn apply_progress(&mut self, progress: CycleProgress) {
        self.weeks_completed = progress.weeks_completed;
        self.total_weeks = progress.total_weeks;
        self.percent = progress.percent;
        self.is_completed = progress.is_completed;
    }

    pub(crate) fn apply_scores(&mut self, baseline: Option<f64>, current: Option<f64>) {
        let ScoreComparison { difference, status } = compare(baseline, current);
        self.baseline_score = baseline;
        self.current_score = current;
        self.score_difference = difference;
        self.improvement_status = status;
    }
}

/// Latest scores the analysis provider reports for a concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub concern_name: String,
    #[serde(default)]
    pub baseline_score: Option<f64>,
    #[serde(default)]
    pub current_score: Option<f64>,
}

/// One verdict in a `rateEffectiveness` batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRequest {
    pub concern_name: String,
    pub is_effective: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingAction {
    Pause,
    Resume,
}

/// Self-reported answer to "have you been using this consistently?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageConsistency {
    Yes,
    No,
}

/// One pass through the usage review prompt. Only a `No` answer that the user
/// then confirms stops tracking.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageReview {
    #[serde(default)]
    pub response: Option<UsageConsistency>,
    #[serde(default)]
    pub confirm_stop: bool,
    /// Restrict the stop to these concerns; `None` stops the whole item.
    #[serde(default)]
    pub concerns: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReviewOutcome {
    pub show_stop_tracking: bool,
    pub paused: Vec<String>,
}
