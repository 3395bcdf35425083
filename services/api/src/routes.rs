use crate::infra::{deserialize_optional_date, preview_tracking, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use skincare_tracker::error::AppError;
use skincare_tracker::workflows::routine::RoutineItemDraft;
use skincare_tracker::workflows::tracking::{
    tracking_router, RoutineRepository, RoutineTrackingService, TrackingReport,
};
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct TrackingReportRequest {
    pub(crate) item: RoutineItemDraft,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) scores_csv: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TrackingReportResponse {
    pub(crate) today: NaiveDate,
    pub(crate) score_source: ScoreSource,
    pub(crate) report: TrackingReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ScoreSource {
    AnalysisExport,
    NotProvided,
}

pub(crate) fn with_tracking_routes<R>(service: Arc<RoutineTrackingService<R>>) -> axum::Router
where
    R: RoutineRepository + 'static,
{
    tracking_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/tracking/report",
            axum::routing::post(tracking_report_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Stateless preview: evaluates a routine item draft without saving it.
pub(crate) async fn tracking_report_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<TrackingReportRequest>,
) -> Result<Json<TrackingReportResponse>, AppError> {
    let TrackingReportRequest {
        item,
        today,
        scores_csv,
    } = payload;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let score_source = if scores_csv.is_some() {
        ScoreSource::AnalysisExport
    } else {
        ScoreSource::NotProvided
    };
    let scores = scores_csv.map(|csv| Cursor::new(csv.into_bytes()));
    let tracked = preview_tracking(item, today, &state.tracking, scores)?;

    Ok(Json(TrackingReportResponse {
        today,
        score_source,
        report: tracked.report(),
    }))
}
