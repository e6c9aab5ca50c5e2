// libs/scheduling-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// CORE BOOKING MODELS
// ==============================================================================

pub const MIN_DURATION_MINUTES: i32 = 15;
pub const MAX_DURATION_MINUTES: i32 = 240;
pub const DEFAULT_DURATION_MINUTES: i32 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: BookingStatus,
    pub duration_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Start of the booked range, in minutes since midnight.
    pub fn start_minute(&self) -> i32 {
        minute_of_day(self.time)
    }

    /// Exclusive end of the booked range, in minutes since midnight.
    pub fn end_minute(&self) -> i32 {
        self.start_minute() + self.duration_minutes
    }
}

/// All time arithmetic happens in whole minutes since midnight.
pub fn minute_of_day(time: NaiveTime) -> i32 {
    (time.hour() * 60 + time.minute()) as i32
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    /// An active booking still occupies its time slot. Terminal statuses
    /// never block a new booking, even at the exact same time.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            BookingStatus::Scheduled | BookingStatus::Confirmed | BookingStatus::InProgress
        )
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Allowed lifecycle moves. Terminal statuses accept no further change.
    /// A no-show can only be recorded before the visit starts, and only a
    /// visit that is in progress can complete.
    pub fn can_transition_to(&self, next: &BookingStatus) -> bool {
        match (self, next) {
            (BookingStatus::Scheduled, BookingStatus::Confirmed)
            | (BookingStatus::Scheduled, BookingStatus::InProgress)
            | (BookingStatus::Scheduled, BookingStatus::Cancelled)
            | (BookingStatus::Scheduled, BookingStatus::NoShow)
            | (BookingStatus::Confirmed, BookingStatus::InProgress)
            | (BookingStatus::Confirmed, BookingStatus::Cancelled)
            | (BookingStatus::Confirmed, BookingStatus::NoShow)
            | (BookingStatus::InProgress, BookingStatus::Completed)
            | (BookingStatus::InProgress, BookingStatus::Cancelled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Scheduled => write!(f, "scheduled"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::InProgress => write!(f, "in_progress"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
            BookingStatus::NoShow => write!(f, "no_show"),
        }
    }
}

// ==============================================================================
// WORKING HOURS AND SLOT CANDIDATES
// ==============================================================================

/// A day's bookable window. Always passed in explicitly so different
/// doctors or departments can run different hours; defaults come from
/// configuration, not from this crate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WorkingHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub slot_minutes: i32,
}

impl WorkingHours {
    pub fn new(start: NaiveTime, end: NaiveTime, slot_minutes: i32) -> Self {
        Self {
            start,
            end,
            slot_minutes,
        }
    }
}

/// A proposed booking to test against the calendar. `exclude_booking_id`
/// is set when rescheduling, so a booking never conflicts with itself.
#[derive(Debug, Clone, Copy)]
pub struct SlotCandidate {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i32,
    pub exclude_booking_id: Option<Uuid>,
}

/// Outcome of a point availability check. A conflict is a normal result,
/// not an error.
#[derive(Debug, Clone)]
pub enum AvailabilityResult {
    Available,
    Conflict { conflicting: Booking },
}

impl AvailabilityResult {
    pub fn is_available(&self) -> bool {
        matches!(self, AvailabilityResult::Available)
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    /// Time of day as `HH:MM` (24-hour).
    pub time: String,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleBookingRequest {
    pub new_date: Option<NaiveDate>,
    pub new_time: String,
    pub new_duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictCheckRequest {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub duration_minutes: Option<i32>,
    pub exclude_booking_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicting_booking: Option<Booking>,
}

impl From<AvailabilityResult> for AvailabilityResponse {
    fn from(result: AvailabilityResult) -> Self {
        match result {
            AvailabilityResult::Available => Self {
                available: true,
                conflicting_booking: None,
            },
            AvailabilityResult::Conflict { conflicting } => Self {
                available: false,
                conflicting_booking: Some(conflicting),
            },
        }
    }
}

// ==============================================================================
// VALIDATION RULES
// ==============================================================================

#[derive(Debug, Clone)]
pub struct BookingRules {
    pub default_duration_minutes: i32,
    pub min_duration_minutes: i32,
    pub max_duration_minutes: i32,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
            min_duration_minutes: MIN_DURATION_MINUTES,
            max_duration_minutes: MAX_DURATION_MINUTES,
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum SchedulingError {
    #[error("Booking not found")]
    NotFound,

    #[error("Time slot is already booked")]
    SlotTaken { conflicting: Box<Booking> },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Booking cannot be modified in current status: {0}")]
    InvalidStatusTransition(BookingStatus),
}

impl From<SchedulingError> for shared_models::AppError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::NotFound => shared_models::AppError::NotFound(err.to_string()),
            SchedulingError::SlotTaken { .. } => shared_models::AppError::Conflict(err.to_string()),
            SchedulingError::Validation(msg) => shared_models::AppError::ValidationError(msg),
            SchedulingError::InvalidStatusTransition(_) => {
                shared_models::AppError::BadRequest(err.to_string())
            }
        }
    }
}
