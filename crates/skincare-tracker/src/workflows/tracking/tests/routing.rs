use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use chrono::{Duration, Local, NaiveDate};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::TrackingConfig;
use crate::workflows::tracking::router::{create_handler, tracking_handler};
use crate::workflows::tracking::RoutineTrackingService;

fn days_ago(days: i64) -> NaiveDate {
    Local::now().date_naive() - Duration::days(days)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn create(router: &axum::Router, started_days_ago: i64) -> String {
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/routine/items",
            serde_json::to_value(serum_draft(days_ago(started_days_ago))).unwrap(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let payload = read_json_body(response).await;
    payload["routine_item_id"]
        .as_str()
        .expect("id in payload")
        .to_string()
}

#[tokio::test]
async fn create_route_returns_tracking_report() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/routine/items",
            serde_json::to_value(serum_draft(days_ago(3))).unwrap(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["item_name"], "Azelaic Acid Serum");
    assert_eq!(payload["total"], 2);
    assert_eq!(payload["concerns"][0]["concern_name"], "acne");
    assert_eq!(payload["concerns"][0]["concern_label"], "Breakouts");
    assert_eq!(payload["concerns"][0]["state"], "active");
    assert_eq!(payload["concerns"][0]["next_action"], "keep_tracking");
}

#[tokio::test]
async fn create_route_rejects_future_start_dates() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let draft = serum_draft(Local::now().date_naive() + Duration::days(2));
    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/routine/items",
            serde_json::to_value(draft).unwrap(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["code"], "validation");
}

#[tokio::test]
async fn rating_route_rejects_incomplete_cycles() {
    let (service, _) = build_service();
    let router = router_with_service(service);
    let id = create(&router, 3).await;

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/routine/items/{id}/ratings"),
            json!([{ "concern_name": "acne", "is_effective": true }]),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json_body(response).await;
    assert_eq!(payload["code"], "not_completed");
}

#[tokio::test]
async fn rating_route_records_verdicts_for_completed_cycles() {
    let (service, _) = build_service();
    let router = router_with_service(service);
    let id = create(&router, 35).await;

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/routine/items/{id}/ratings"),
            json!([{ "concern_name": "Redness", "is_effective": true }]),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["ratings"][0]["entry"]["concern_name"], "redness");
    assert_eq!(payload["ratings"][0]["entry"]["is_effective"], true);

    let tracking = router
        .oneshot(
            Request::get(format!("/api/v1/routine/items/{id}/tracking"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let payload = read_json_body(tracking).await;
    assert_eq!(payload["concerns"][1]["state"], "rated");
    assert_eq!(payload["concerns"][1]["effectiveness_rating"], true);
    assert_eq!(payload["concerns"][0]["next_action"], "take_photo");
    assert_eq!(payload["awaiting_photo"], 1);
}

#[tokio::test]
async fn toggle_route_pauses_tracking() {
    let (service, _) = build_service();
    let router = router_with_service(service);
    let id = create(&router, 10).await;

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/routine/items/{id}/tracking/toggle"),
            json!({ "action": "pause" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["action"], "pause");
    assert_eq!(payload["changed"], json!(["acne", "redness"]));

    let review = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/routine/items/{id}/review"),
            json!({ "response": "no", "confirm_stop": true }),
        ))
        .await
        .unwrap();
    let payload = read_json_body(review).await;
    assert_eq!(payload["show_stop_tracking"], true);
    assert_eq!(payload["paused"], json!([]));
}

#[tokio::test]
async fn patch_and_delete_routes_manage_items() {
    let (service, _) = build_service();
    let router = router_with_service(service);
    let id = create(&router, 10).await;

    let response = router
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/v1/routine/items/{id}"),
            json!({ "name": "Azelaic Acid 10%" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["item_name"], "Azelaic Acid 10%");

    let response = router
        .clone()
        .oneshot(
            Request::delete(format!("/api/v1/routine/items/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = router
        .oneshot(
            Request::get(format!("/api/v1/routine/items/{id}/tracking"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["code"], "not_found");
}

#[tokio::test]
async fn scores_route_rejects_unknown_concerns() {
    let (service, _) = build_service();
    let router = router_with_service(service);
    let id = create(&router, 10).await;

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/routine/items/{id}/scores"),
            json!([{ "concern_name": "wrinkles", "baseline_score": 40, "current_score": 45 }]),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["code"], "unknown_concern");
}

#[tokio::test]
async fn handlers_return_internal_error_on_repository_failure() {
    let service = Arc::new(RoutineTrackingService::new(
        Arc::new(UnavailableRepository),
        TrackingConfig::default(),
    ));

    let response = create_handler::<UnavailableRepository>(
        State(service.clone()),
        axum::Json(serum_draft(days_ago(3))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = tracking_handler::<UnavailableRepository>(
        State(service),
        Path("item-000001".to_string()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert_eq!(payload["code"], "unavailable");
}
