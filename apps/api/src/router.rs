use std::sync::Arc;

use axum::{routing::get, Router};

use scheduling_cell::router::scheduling_routes;
use scheduling_cell::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Slot scheduler API is running!" }))
        .nest("/scheduling", scheduling_routes(state))
}
