use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use skincare_tracker::config::TrackingConfig;
use skincare_tracker::error::AppError;
use skincare_tracker::workflows::analysis::ScoreHistoryImporter;
use skincare_tracker::workflows::routine::{RoutineItemDraft, RoutineItemId};
use skincare_tracker::workflows::tracking::{RepositoryError, RoutineRepository, TrackedRoutine};
use std::collections::HashMap;
use std::io::Read;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) tracking: TrackingConfig,
}

/// Process-local routine storage. Each `modify` holds the map lock for the
/// whole change, so writers to one record are serialized.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRoutineRepository {
    records: Arc<Mutex<HashMap<RoutineItemId, TrackedRoutine>>>,
}

impl InMemoryRoutineRepository {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<RoutineItemId, TrackedRoutine>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl RoutineRepository for InMemoryRoutineRepository {
    fn insert(&self, record: TrackedRoutine) -> Result<TrackedRoutine, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(record.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id().clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &RoutineItemId) -> Result<Option<TrackedRoutine>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.get(id).cloned())
    }

    fn modify<T, E, F>(&self, id: &RoutineItemId, change: F) -> Result<T, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut TrackedRoutine) -> Result<T, E>,
    {
        let mut guard = self.lock()?;
        let mut working = guard.get(id).cloned().ok_or(RepositoryError::NotFound)?;
        let value = change(&mut working)?;
        guard.insert(id.clone(), working);
        Ok(value)
    }

    fn delete(&self, id: &RoutineItemId) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        guard
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

/// Evaluate an unsaved item on `today`, optionally hydrating scores from an
/// analysis export. Nothing is stored.
pub(crate) fn preview_tracking<R: Read>(
    draft: RoutineItemDraft,
    today: NaiveDate,
    tracking: &TrackingConfig,
    scores: Option<R>,
) -> Result<TrackedRoutine, AppError> {
    let item = draft.validate(
        RoutineItemId("preview".to_string()),
        tracking.default_required_days,
        today,
    )?;
    let mut tracked = TrackedRoutine::start(item, today);

    if let Some(reader) = scores {
        let history = ScoreHistoryImporter::from_reader(reader)?;
        let updates = history.score_updates(&tracked, today);
        tracked.apply_scores(&updates, today)?;
    }

    Ok(tracked)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
