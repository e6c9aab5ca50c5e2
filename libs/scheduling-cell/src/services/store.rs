// libs/scheduling-cell/src/services/store.rs
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Booking;

/// Persistence seam for bookings. The allocator never touches this; only
/// `BookingService` does, and it serializes check-then-write itself. A
/// database-backed implementation must still provide its own transactional
/// guarantee (serializable transaction or optimistic retry) when the
/// service is run with more than one process.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Option<Booking>;
    async fn bookings_for_day(&self, doctor_id: Uuid, date: NaiveDate) -> Vec<Booking>;
    async fn insert(&self, booking: Booking);
    /// Replace an existing booking. Returns false when the id is unknown.
    async fn update(&self, booking: Booking) -> bool;
}

/// In-process store used by the server and the test suite.
pub struct MemoryBookingStore {
    bookings: RwLock<HashMap<Uuid, Booking>>,
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self {
            bookings: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryBookingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn get(&self, id: Uuid) -> Option<Booking> {
        self.bookings.read().await.get(&id).cloned()
    }

    async fn bookings_for_day(&self, doctor_id: Uuid, date: NaiveDate) -> Vec<Booking> {
        let mut day: Vec<Booking> = self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| b.doctor_id == doctor_id && b.date == date)
            .cloned()
            .collect();
        day.sort_by(|a, b| a.time.cmp(&b.time));
        day
    }

    async fn insert(&self, booking: Booking) {
        self.bookings.write().await.insert(booking.id, booking);
    }

    async fn update(&self, booking: Booking) -> bool {
        let mut bookings = self.bookings.write().await;
        match bookings.get_mut(&booking.id) {
            Some(entry) => {
                *entry = booking;
                true
            }
            None => false,
        }
    }
}
