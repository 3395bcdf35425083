use super::lifecycle::TrackedRoutine;
use crate::workflows::routine::RoutineItemId;

/// Storage abstraction so the service module can be exercised in isolation.
///
/// `fetch` hands out an owned snapshot for reads. Every write goes through
/// `modify`, which applies a change to the stored record while holding the
/// record exclusively, so a precondition checked inside the change cannot be
/// invalidated by another writer before it is saved.
pub trait RoutineRepository: Send + Sync {
    fn insert(&self, record: TrackedRoutine) -> Result<TrackedRoutine, RepositoryError>;
    fn fetch(&self, id: &RoutineItemId) -> Result<Option<TrackedRoutine>, RepositoryError>;

    /// Run `change` against the stored record and keep the result only when it
    /// returns `Ok`. A missing record is `RepositoryError::NotFound`.
    fn modify<T, E, F>(&self, id: &RoutineItemId, change: F) -> Result<T, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut TrackedRoutine) -> Result<T, E>;

    fn delete(&self, id: &RoutineItemId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
