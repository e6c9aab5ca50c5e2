// libs/scheduling-cell/tests/handlers_test.rs
//
// HTTP-level tests driving the scheduling router in-process.
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveTime;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use scheduling_cell::router::scheduling_routes;
use scheduling_cell::AppState;
use shared_config::AppConfig;

fn test_config() -> AppConfig {
    AppConfig {
        bind_port: 3000,
        default_day_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        default_day_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        default_slot_minutes: 30,
    }
}

fn create_test_app() -> Router {
    scheduling_routes(Arc::new(AppState::new(test_config())))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_available_slots_full_day() {
    let app = create_test_app();
    let doctor_id = Uuid::new_v4();

    let uri = format!("/doctors/{}/available-slots?date=2024-02-15", doctor_id);
    let response = app.oneshot(get_request(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["total"], 16);
    assert_eq!(body["slots"][0], "09:00");
    assert_eq!(body["slots"][15], "16:30");
}

#[tokio::test]
async fn test_available_slots_with_custom_hours() {
    let app = create_test_app();
    let doctor_id = Uuid::new_v4();

    let uri = format!(
        "/doctors/{}/available-slots?date=2024-02-15&start=10:00&end=12:00&slot_minutes=60",
        doctor_id
    );
    let response = app.oneshot(get_request(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["slots"], json!(["10:00", "11:00"]));
}

#[tokio::test]
async fn test_booking_removes_slot_from_listing() {
    let app = create_test_app();
    let doctor_id = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/bookings",
            json!({
                "doctor_id": doctor_id,
                "date": "2024-02-15",
                "time": "09:00",
                "duration_minutes": 30
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let uri = format!("/doctors/{}/available-slots?date=2024-02-15", doctor_id);
    let response = app.oneshot(get_request(&uri)).await.unwrap();
    let body = response_json(response).await;

    assert_eq!(body["total"], 15);
    assert_eq!(body["slots"][0], "09:30");
}

#[tokio::test]
async fn test_double_booking_returns_conflict() {
    let app = create_test_app();
    let doctor_id = Uuid::new_v4();

    let booking = json!({
        "doctor_id": doctor_id,
        "date": "2024-02-15",
        "time": "10:00",
        "duration_minutes": 30
    });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/bookings", booking.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request("POST", "/bookings", booking))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = response_json(response).await;
    assert_eq!(body["error"], "Time slot is already booked");
}

#[tokio::test]
async fn test_conflict_check_endpoint() {
    let app = create_test_app();
    let doctor_id = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/bookings",
            json!({
                "doctor_id": doctor_id,
                "date": "2024-02-15",
                "time": "10:00",
                "duration_minutes": 30
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same slot: conflict, with the blocking booking in the payload
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/conflict-check",
            json!({
                "doctor_id": doctor_id,
                "date": "2024-02-15",
                "time": "10:00"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["available"], false);
    assert_eq!(body["conflicting_booking"]["doctor_id"], json!(doctor_id));

    // The next half-hour is free
    let response = app
        .oneshot(json_request(
            "POST",
            "/conflict-check",
            json!({
                "doctor_id": doctor_id,
                "date": "2024-02-15",
                "time": "10:30"
            }),
        ))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["available"], true);
    assert!(body.get("conflicting_booking").is_none());
}

#[tokio::test]
async fn test_invalid_time_returns_bad_request() {
    let app = create_test_app();
    let doctor_id = Uuid::new_v4();

    let response = app
        .oneshot(json_request(
            "POST",
            "/bookings",
            json!({
                "doctor_id": doctor_id,
                "date": "2024-02-15",
                "time": "25:99",
                "duration_minutes": 30
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reschedule_flow() {
    let app = create_test_app();
    let doctor_id = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/bookings",
            json!({
                "doctor_id": doctor_id,
                "date": "2024-02-15",
                "time": "10:00",
                "duration_minutes": 30
            }),
        ))
        .await
        .unwrap();
    let created = response_json(response).await;
    let booking_id = created["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/bookings/{}/reschedule", booking_id),
            json!({ "new_time": "14:00" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["time"], "14:00:00");

    // The old slot is free again
    let uri = format!("/doctors/{}/available-slots?date=2024-02-15", doctor_id);
    let response = app.oneshot(get_request(&uri)).await.unwrap();
    let body = response_json(response).await;
    let slots = body["slots"].as_array().unwrap();
    assert!(slots.contains(&json!("10:00")));
    assert!(!slots.contains(&json!("14:00")));
}

#[tokio::test]
async fn test_cancel_flow() {
    let app = create_test_app();
    let doctor_id = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/bookings",
            json!({
                "doctor_id": doctor_id,
                "date": "2024-02-15",
                "time": "09:00",
                "duration_minutes": 30
            }),
        ))
        .await
        .unwrap();
    let created = response_json(response).await;
    let booking_id = created["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/bookings/{}/cancel", booking_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "cancelled");

    let uri = format!("/doctors/{}/available-slots?date=2024-02-15", doctor_id);
    let response = app.oneshot(get_request(&uri)).await.unwrap();
    let body = response_json(response).await;
    assert_eq!(body["total"], 16);
}

#[tokio::test]
async fn test_get_unknown_booking_returns_not_found() {
    let app = create_test_app();

    let response = app
        .oneshot(get_request(&format!("/bookings/{}", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
