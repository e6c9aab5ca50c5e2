use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::AppError;

use crate::models::{
    AvailabilityResponse, ConflictCheckRequest, CreateBookingRequest, RescheduleBookingRequest,
    SlotCandidate, WorkingHours, DEFAULT_DURATION_MINUTES,
};
use crate::services::allocator;
use crate::AppState;

// Query parameters for the availability endpoint
#[derive(Debug, Deserialize)]
pub struct AvailableSlotsQuery {
    pub date: NaiveDate,
    /// Override the configured day start, `HH:MM`.
    pub start: Option<String>,
    /// Override the configured day end, `HH:MM`.
    pub end: Option<String>,
    pub slot_minutes: Option<i32>,
}

// ==============================================================================
// PUBLIC HANDLERS (AVAILABILITY QUERIES)
// ==============================================================================

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let hours = working_hours_from_query(&state, &query)?;

    let slots = state
        .bookings
        .available_slots(doctor_id, query.date, &hours)
        .await?;

    let total = slots.len();
    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": query.date,
        "slots": slots,
        "total": total
    })))
}

#[axum::debug_handler]
pub async fn check_conflict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConflictCheckRequest>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let time = allocator::parse_slot_time(&request.time)?;

    let candidate = SlotCandidate {
        doctor_id: request.doctor_id,
        date: request.date,
        time,
        duration_minutes: request.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
        exclude_booking_id: request.exclude_booking_id,
    };

    let result = state.bookings.check(&candidate).await?;
    Ok(Json(result.into()))
}

// ==============================================================================
// BOOKING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let booking = state.bookings.book(request).await?;
    Ok((StatusCode::CREATED, Json(json!(booking))))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking = state.bookings.get_booking(booking_id).await?;
    Ok(Json(json!(booking)))
}

#[axum::debug_handler]
pub async fn reschedule_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<RescheduleBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let booking = state.bookings.reschedule(booking_id, request).await?;
    Ok(Json(json!(booking)))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking = state.bookings.cancel(booking_id).await?;
    Ok(Json(json!(booking)))
}

// ==============================================================================
// HELPERS
// ==============================================================================

fn working_hours_from_query(
    state: &AppState,
    query: &AvailableSlotsQuery,
) -> Result<WorkingHours, AppError> {
    let start = match &query.start {
        Some(raw) => allocator::parse_slot_time(raw)?,
        None => state.config.default_day_start,
    };
    let end = match &query.end {
        Some(raw) => allocator::parse_slot_time(raw)?,
        None => state.config.default_day_end,
    };
    let slot_minutes = query
        .slot_minutes
        .unwrap_or(state.config.default_slot_minutes);

    Ok(WorkingHours::new(start, end, slot_minutes))
}
