use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use chrono::{Local, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{RatingRequest, ScoreUpdate, TrackingAction, UsageReview};
use super::ledger::RatingError;
use super::repository::{RepositoryError, RoutineRepository};
use super::service::{RoutineTrackingService, TrackingServiceError};
use crate::workflows::routine::{RoutineItemDraft, RoutineItemId, RoutineItemPatch};

/// Router builder exposing the routine service endpoints.
pub fn tracking_router<R>(service: Arc<RoutineTrackingService<R>>) -> Router
where
    R: RoutineRepository + 'static,
{
    Router::new()
        .route("/api/v1/routine/items", post(create_handler::<R>))
        .route(
            "/api/v1/routine/items/:item_id",
            patch(update_handler::<R>).delete(delete_handler::<R>),
        )
        .route(
            "/api/v1/routine/items/:item_id/tracking",
            get(tracking_handler::<R>),
        )
        .route(
            "/api/v1/routine/items/:item_id/tracking/toggle",
            post(toggle_handler::<R>),
        )
        .route(
            "/api/v1/routine/items/:item_id/ratings",
            post(rating_handler::<R>),
        )
        .route(
            "/api/v1/routine/items/:item_id/scores",
            post(scores_handler::<R>),
        )
        .route(
            "/api/v1/routine/items/:item_id/review",
            post(review_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToggleRequest {
    pub(crate) action: TrackingAction,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<RoutineTrackingService<R>>>,
    axum::Json(draft): axum::Json<RoutineItemDraft>,
) -> Response
where
    R: RoutineRepository + 'static,
{
    match service.create_item(draft, today()) {
        Ok(tracked) => (StatusCode::CREATED, axum::Json(tracked.report())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn tracking_handler<R>(
    State(service): State<Arc<RoutineTrackingService<R>>>,
    Path(item_id): Path<String>,
) -> Response
where
    R: RoutineRepository + 'static,
{
    match service.concern_tracking(&RoutineItemId(item_id), today()) {
        Ok(tracked) => (StatusCode::OK, axum::Json(tracked.report())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn rating_handler<R>(
    State(service): State<Arc<RoutineTrackingService<R>>>,
    Path(item_id): Path<String>,
    axum::Json(ratings): axum::Json<Vec<RatingRequest>>,
) -> Response
where
    R: RoutineRepository + 'static,
{
    let id = RoutineItemId(item_id);
    match service.rate_effectiveness(&id, &ratings, today(), Utc::now()) {
        Ok(outcomes) => {
            let payload = json!({
                "routine_item_id": id.0,
                "ratings": outcomes,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn toggle_handler<R>(
    State(service): State<Arc<RoutineTrackingService<R>>>,
    Path(item_id): Path<String>,
    axum::Json(request): axum::Json<ToggleRequest>,
) -> Response
where
    R: RoutineRepository + 'static,
{
    let id = RoutineItemId(item_id);
    match service.toggle_tracking(&id, request.action, today()) {
        Ok(changed) => {
            let payload = json!({
                "routine_item_id": id.0,
                "action": request.action,
                "changed": changed,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn review_handler<R>(
    State(service): State<Arc<RoutineTrackingService<R>>>,
    Path(item_id): Path<String>,
    axum::Json(review): axum::Json<UsageReview>,
) -> Response
where
    R: RoutineRepository + 'static,
{
    match service.review_usage(&RoutineItemId(item_id), &review, today()) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<RoutineTrackingService<R>>>,
    Path(item_id): Path<String>,
    axum::Json(patch): axum::Json<RoutineItemPatch>,
) -> Response
where
    R: RoutineRepository + 'static,
{
    match service.update_item(&RoutineItemId(item_id), patch, today()) {
        Ok(tracked) => (StatusCode::OK, axum::Json(tracked.report())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<RoutineTrackingService<R>>>,
    Path(item_id): Path<String>,
) -> Response
where
    R: RoutineRepository + 'static,
{
    match service.delete_item(&RoutineItemId(item_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn scores_handler<R>(
    State(service): State<Arc<RoutineTrackingService<R>>>,
    Path(item_id): Path<String>,
    axum::Json(updates): axum::Json<Vec<ScoreUpdate>>,
) -> Response
where
    R: RoutineRepository + 'static,
{
    match service.record_scores(&RoutineItemId(item_id), &updates, today()) {
        Ok(tracked) => (StatusCode::OK, axum::Json(tracked.report())).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: TrackingServiceError) -> Response {
    let (status, code) = match &error {
        TrackingServiceError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation"),
        TrackingServiceError::Rating(RatingError::NotCompleted { .. }) => {
            (StatusCode::CONFLICT, "not_completed")
        }
        TrackingServiceError::Rating(RatingError::StaleState { .. }) => {
            (StatusCode::CONFLICT, "stale_state")
        }
        TrackingServiceError::Rating(RatingError::UnknownConcern { .. }) => {
            (StatusCode::NOT_FOUND, "unknown_concern")
        }
        TrackingServiceError::Repository(RepositoryError::NotFound) => {
            (StatusCode::NOT_FOUND, "not_found")
        }
        TrackingServiceError::Repository(RepositoryError::Conflict) => {
            (StatusCode::CONFLICT, "conflict")
        }
        TrackingServiceError::Repository(RepositoryError::Unavailable(_)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "unavailable")
        }
    };

    let payload = json!({
        "error": error.to_string(),
        "code": code,
    });
    (status, axum::Json(payload)).into_response()
}
