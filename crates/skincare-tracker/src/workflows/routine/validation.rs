use chrono::NaiveDate;
use std::collections::BTreeSet;

use super::domain::{
    RoutineItem, RoutineItemDraft, RoutineItemId, RoutineItemKind, RoutineSchedule,
};
use crate::workflows::concerns;

/// Reasons a routine item cannot be saved. Every variant is recoverable by
/// editing the form and saving again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("routine item name must not be empty")]
    MissingName,
    #[error("routine item kind is required")]
    MissingKind,
    #[error("at least one concern must be tracked")]
    NoConcerns,
    #[error("usage time is required for {kind:?} items")]
    MissingUsage { kind: RoutineItemKind },
    #[error("usage frequency is required for {kind:?} items")]
    MissingFrequency { kind: RoutineItemKind },
    #[error("start date is required for {kind:?} items")]
    MissingStartDate { kind: RoutineItemKind },
    #[error("treatment date is required for {kind:?} items")]
    MissingTreatmentDate { kind: RoutineItemKind },
    #[error("{kind:?} items take a {expected} date, not a {found} date")]
    ConflictingDates {
        kind: RoutineItemKind,
        expected: &'static str,
        found: &'static str,
    },
    #[error("{field} date {date} is in the future")]
    FutureDate {
        field: &'static str,
        date: NaiveDate,
    },
    #[error("end date {end} is before {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("required tracking days must be positive (found {0})")]
    InvalidRequiredDays(i64),
}

impl RoutineItemDraft {
    /// Validate the draft into a [`RoutineItem`].
    ///
    /// `default_required_days` applies when the draft leaves the tracking window
    /// unset. Concern tokens are canonicalised and de-duplicated.
    pub fn validate(
        self,
        id: RoutineItemId,
        default_required_days: u32,
        today: NaiveDate,
    ) -> Result<RoutineItem, ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        let kind = self.kind.ok_or(ValidationError::MissingKind)?;

        let concerns: BTreeSet<String> = self
            .concerns
            .iter()
            .map(|raw| concerns::canonical_token(raw))
            .filter(|token| !token.is_empty())
            .collect();
        if concerns.is_empty() {
            return Err(ValidationError::NoConcerns);
        }

        let schedule = if kind.is_treatment() {
            if self.start_date.is_some() {
                return Err(ValidationError::ConflictingDates {
                    kind,
                    expected: "treatment",
                    found: "start",
                });
            }
            let treatment_date = self
                .treatment_date
                .ok_or(ValidationError::MissingTreatmentDate { kind })?;
            reject_future("treatment", treatment_date, today)?;
            RoutineSchedule::Treatment { treatment_date }
        } else {
            if self.treatment_date.is_some() {
                return Err(ValidationError::ConflictingDates {
                    kind,
                    expected: "start",
                    found: "treatment",
                });
            }
            let usage = self.usage.ok_or(ValidationError::MissingUsage { kind })?;
            let frequency = self
                .frequency
                .ok_or(ValidationError::MissingFrequency { kind })?;
            let start_date = self
                .start_date
                .ok_or(ValidationError::MissingStartDate { kind })?;
            reject_future("start", start_date, today)?;
            RoutineSchedule::Recurring {
                usage,
                frequency,
                start_date,
            }
        };

        if let Some(end) = self.end_date {
            let start = schedule.anchor_date();
            if end < start {
                return Err(ValidationError::EndBeforeStart { start, end });
            }
        }

        let required_days = match self.required_days {
            None => i64::from(default_required_days),
            Some(days) => days,
        };
        if required_days <= 0 {
            return Err(ValidationError::InvalidRequiredDays(required_days));
        }
        let required_days = u32::try_from(required_days)
            .map_err(|_| ValidationError::InvalidRequiredDays(required_days))?;

        Ok(RoutineItem {
            id,
            name,
            kind,
            schedule,
            concerns,
            end_date: self.end_date,
            required_days,
            product: self.product,
        })
    }
}

fn reject_future(
    field: &'static str,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    if date > today {
        Err(ValidationError::FutureDate { field, date })
    } else {
        Ok(())
    }
}
