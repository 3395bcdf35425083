//! Effectiveness tracking for routine items.
//!
//! Leaf modules are pure: [`progress`] turns a start date and window into
//! weeks, [`comparison`] classifies baseline vs current scores, and [`ledger`]
//! keeps the verdicts. [`lifecycle`] composes them per item, and the service
//! and router put that behind storage and HTTP.

pub mod comparison;
pub mod domain;
pub mod ledger;
pub mod lifecycle;
pub mod progress;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use comparison::{compare, ImprovementStatus, ScoreComparison};
pub use domain::{
    ConcernTracking, NextAction, RatingRequest, ReviewOutcome, ScoreUpdate, TrackingAction,
    TrackingState, UsageConsistency, UsageReview,
};
pub use ledger::{EffectivenessLedger, RatingEntry, RatingError, RatingOutcome};
pub use lifecycle::TrackedRoutine;
pub use progress::{compute_progress, effective_now, CycleProgress};
pub use report::{ConcernTrackingView, TrackingReport};
pub use repository::{RepositoryError, RoutineRepository};
pub use router::tracking_router;
pub use service::{RoutineTrackingService, TrackingServiceError};
