pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use services::*;

use std::sync::Arc;

use shared_config::AppConfig;

use crate::services::booking::BookingService;
use crate::services::store::MemoryBookingStore;

/// Shared state for the scheduling routes.
pub struct AppState {
    pub config: AppConfig,
    pub bookings: BookingService,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(MemoryBookingStore::new());
        Self {
            config,
            bookings: BookingService::new(store),
        }
    }
}
