pub mod allocator;
pub mod booking;
pub mod store;

pub use booking::BookingService;
pub use store::{BookingStore, MemoryBookingStore};
