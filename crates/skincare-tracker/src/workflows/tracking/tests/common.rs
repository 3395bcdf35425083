use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{Duration, NaiveDate};
use serde_json::Value;

use crate::config::TrackingConfig;
use crate::workflows::routine::{
    RoutineItemDraft, RoutineItemId, RoutineItemKind, UsageFrequency, UsageTime,
};
use crate::workflows::tracking::{
    tracking_router, RepositoryError, RoutineRepository, RoutineTrackingService, TrackedRoutine,
};

pub(super) fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid date")
}

pub(super) fn days_after_start(days: i64) -> NaiveDate {
    start_date() + Duration::days(days)
}

pub(super) fn serum_draft(start: NaiveDate) -> RoutineItemDraft {
    RoutineItemDraft {
        name: "Azelaic Acid Serum".to_string(),
        kind: Some(RoutineItemKind::Product),
        usage: Some(UsageTime::Pm),
        frequency: Some(UsageFrequency::Daily),
        concerns: vec!["Redness".to_string(), "acne".to_string()],
        start_date: Some(start),
        ..RoutineItemDraft::default()
    }
}

pub(super) fn peel_draft(treatment_date: NaiveDate) -> RoutineItemDraft {
    RoutineItemDraft {
        name: "Glycolic Peel".to_string(),
        kind: Some(RoutineItemKind::TreatmentFacial),
        concerns: vec!["texture".to_string()],
        treatment_date: Some(treatment_date),
        required_days: Some(14),
        ..RoutineItemDraft::default()
    }
}

pub(super) fn build_service() -> (
    RoutineTrackingService<MemoryRepository>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = RoutineTrackingService::new(repository.clone(), TrackingConfig::default());
    (service, repository)
}

/// A serum created on the fixed start date, already past its 28-day window
/// when evaluated at `days_after_start(28)` or later.
pub(super) fn created_serum<R>(service: &RoutineTrackingService<R>) -> RoutineItemId
where
    R: RoutineRepository + 'static,
{
    service
        .create_item(serum_draft(start_date()), days_after_start(0))
        .expect("serum is valid")
        .id()
        .clone()
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<RoutineItemId, TrackedRoutine>>>,
}

impl MemoryRepository {
    pub(super) fn stored(&self, id: &RoutineItemId) -> TrackedRoutine {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
            .expect("record present")
    }
}

impl RoutineRepository for MemoryRepository {
    fn insert(&self, record: TrackedRoutine) -> Result<TrackedRoutine, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(record.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id().clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &RoutineItemId) -> Result<Option<TrackedRoutine>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn modify<T, E, F>(&self, id: &RoutineItemId, change: F) -> Result<T, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut TrackedRoutine) -> Result<T, E>,
    {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let mut working = guard.get(id).cloned().ok_or(RepositoryError::NotFound)?;
        let value = change(&mut working)?;
        guard.insert(id.clone(), working);
        Ok(value)
    }

    fn delete(&self, id: &RoutineItemId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

pub(super) struct UnavailableRepository;

impl RoutineRepository for UnavailableRepository {
    fn insert(&self, _record: TrackedRoutine) -> Result<TrackedRoutine, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &RoutineItemId) -> Result<Option<TrackedRoutine>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn modify<T, E, F>(&self, _id: &RoutineItemId, _change: F) -> Result<T, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut TrackedRoutine) -> Result<T, E>,
    {
        Err(RepositoryError::Unavailable("database offline".to_string()).into())
    }

    fn delete(&self, _id: &RoutineItemId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

type SessionWrite = Box<dyn FnOnce(&mut TrackedRoutine) + Send>;

/// Storage shared with a second session whose pending write commits the moment
/// this session touches the record: right after a read has handed out its
/// snapshot, or just before a write takes the record.
#[derive(Default)]
pub(super) struct RacingRepository {
    pub(super) inner: MemoryRepository,
    pending: Mutex<Option<SessionWrite>>,
}

impl RacingRepository {
    pub(super) fn other_session_will(
        &self,
        write: impl FnOnce(&mut TrackedRoutine) + Send + 'static,
    ) {
        *self.pending.lock().expect("pending mutex poisoned") = Some(Box::new(write));
    }

    fn commit_other_session(&self, id: &RoutineItemId) {
        let pending = self.pending.lock().expect("pending mutex poisoned").take();
        if let Some(write) = pending {
            self.inner
                .modify(id, |tracked| {
                    write(tracked);
                    Ok::<(), RepositoryError>(())
                })
                .expect("other session write succeeds");
        }
    }
}

impl RoutineRepository for RacingRepository {
    fn insert(&self, record: TrackedRoutine) -> Result<TrackedRoutine, RepositoryError> {
        self.inner.insert(record)
    }

    fn fetch(&self, id: &RoutineItemId) -> Result<Option<TrackedRoutine>, RepositoryError> {
        let snapshot = self.inner.fetch(id)?;
        self.commit_other_session(id);
        Ok(snapshot)
    }

    fn modify<T, E, F>(&self, id: &RoutineItemId, change: F) -> Result<T, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut TrackedRoutine) -> Result<T, E>,
    {
        self.commit_other_session(id);
        self.inner.modify(id, change)
    }

    fn delete(&self, id: &RoutineItemId) -> Result<(), RepositoryError> {
        self.inner.delete(id)
    }
}

pub(super) fn build_racing_service() -> (
    RoutineTrackingService<RacingRepository>,
    Arc<RacingRepository>,
) {
    let repository = Arc::new(RacingRepository::default());
    let service = RoutineTrackingService::new(repository.clone(), TrackingConfig::default());
    (service, repository)
}

pub(super) fn router_with_service(
    service: RoutineTrackingService<MemoryRepository>,
) -> axum::Router {
    tracking_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
