use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers;
use crate::AppState;

pub fn scheduling_routes(state: Arc<AppState>) -> Router {
    // Availability queries (public read endpoints)
    let availability_routes = Router::new()
        .route(
            "/doctors/{doctor_id}/available-slots",
            get(handlers::get_available_slots),
        )
        .route("/conflict-check", post(handlers::check_conflict));

    // Booking lifecycle
    let booking_routes = Router::new()
        .route("/bookings", post(handlers::create_booking))
        .route("/bookings/{booking_id}", get(handlers::get_booking))
        .route(
            "/bookings/{booking_id}/reschedule",
            patch(handlers::reschedule_booking),
        )
        .route(
            "/bookings/{booking_id}/cancel",
            patch(handlers::cancel_booking),
        );

    Router::new()
        .merge(availability_routes)
        .merge(booking_routes)
        .with_state(state)
}
