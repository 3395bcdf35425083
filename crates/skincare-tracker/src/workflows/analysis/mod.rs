//! Import of skin-analysis score exports.
//!
//! The analysis provider is an opaque oracle; this module only turns its dated
//! per-concern scores into the baseline/current pair each tracking cycle needs.

mod parser;

use crate::workflows::concerns::canonical_token;
use crate::workflows::tracking::{ScoreUpdate, TrackedRoutine};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use parser::AnalysisRecord;

#[derive(Debug, thiserror::Error)]
pub enum ScoreImportError {
    #[error("failed to read analysis export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid analysis CSV data: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreMeasurement {
    pub score: f64,
    pub measured_on: NaiveDate,
}

/// Baseline and latest measurement for one concern within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreSnapshot {
    pub baseline: Option<ScoreMeasurement>,
    pub current: Option<ScoreMeasurement>,
}

/// Dated scores per canonical concern, oldest first.
#[derive(Debug, Clone, Default)]
pub struct ScoreHistory {
    by_concern: BTreeMap<String, Vec<ScoreMeasurement>>,
}

impl ScoreHistory {
    fn from_records(records: Vec<AnalysisRecord>) -> Self {
        let mut by_concern: BTreeMap<String, Vec<ScoreMeasurement>> = BTreeMap::new();
        for record in records {
            by_concern
                .entry(record.concern)
                .or_default()
                .push(ScoreMeasurement {
                    score: record.score,
                    measured_on: record.measured_on,
                });
        }
        for measurements in by_concern.values_mut() {
            measurements.sort_by_key(|measurement| measurement.measured_on);
        }
        Self { by_concern }
    }

    pub fn concerns(&self) -> impl Iterator<Item = &str> {
        self.by_concern.keys().map(String::as_str)
    }

    pub fn measurements(&self, concern: &str) -> &[ScoreMeasurement] {
        self.by_concern
            .get(&canonical_token(concern))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Pick the baseline and current measurement for a cycle starting on
    /// `cycle_start`, ignoring anything after `cutoff`.
    ///
    /// Baseline is the last measurement on or before the cycle start, or the
    /// first one after it when none precedes it. Current is the latest
    /// measurement taken on a later day than the baseline.
    pub fn snapshot(&self, concern: &str, cycle_start: NaiveDate, cutoff: NaiveDate) -> ScoreSnapshot {
        let window: Vec<&ScoreMeasurement> = self
            .measurements(concern)
            .iter()
            .filter(|measurement| measurement.measured_on <= cutoff)
            .collect();

        let baseline = window
            .iter()
            .rev()
            .find(|measurement| measurement.measured_on <= cycle_start)
            .or_else(|| window.first())
            .map(|measurement| **measurement);

        let current = baseline.and_then(|base| {
            window
                .iter()
                .rev()
                .find(|measurement| measurement.measured_on > base.measured_on)
                .map(|measurement| **measurement)
        });

        ScoreSnapshot { baseline, current }
    }

    /// Score updates for every concern of `tracked` that has measurements.
    pub fn score_updates(&self, tracked: &TrackedRoutine, today: NaiveDate) -> Vec<ScoreUpdate> {
        tracked
            .concerns()
            .filter(|tracking| !self.measurements(tracking.concern_name()).is_empty())
            .map(|tracking| {
                let cutoff = tracking.paused_on().map_or(today, |paused| paused.min(today));
                let snapshot = self.snapshot(tracking.concern_name(), tracking.cycle_start(), cutoff);
                ScoreUpdate {
                    concern_name: tracking.concern_name().to_string(),
                    baseline_score: snapshot.baseline.map(|measurement| measurement.score),
                    current_score: snapshot.current.map(|measurement| measurement.score),
                }
            })
            .collect()
    }
}

pub struct ScoreHistoryImporter;

impl ScoreHistoryImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ScoreHistory, ScoreImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<ScoreHistory, ScoreImportError> {
        let records = parser::parse_records(reader)?;
        Ok(ScoreHistory::from_records(records))
    }
}
