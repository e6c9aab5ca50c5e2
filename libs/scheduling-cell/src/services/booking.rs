// libs/scheduling-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    AvailabilityResult, Booking, BookingRules, BookingStatus, CreateBookingRequest,
    RescheduleBookingRequest, SchedulingError, SlotCandidate, WorkingHours,
};
use crate::services::allocator;
use crate::services::store::BookingStore;

/// Booking workflow over the pure allocator.
///
/// Every mutating operation runs read, conflict check, and write under one
/// `write_gate` guard, so two concurrent requests for the same slot cannot
/// both pass the check. A store backed by a real database must provide the
/// same guarantee with a transaction.
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    rules: BookingRules,
    write_gate: Mutex<()>,
}

impl BookingService {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self::with_rules(store, BookingRules::default())
    }

    pub fn with_rules(store: Arc<dyn BookingStore>, rules: BookingRules) -> Self {
        Self {
            store,
            rules,
            write_gate: Mutex::new(()),
        }
    }

    /// Book a new appointment slot.
    pub async fn book(&self, request: CreateBookingRequest) -> Result<Booking, SchedulingError> {
        let time = allocator::parse_slot_time(&request.time)?;
        let duration_minutes = self.resolve_duration(request.duration_minutes)?;

        let candidate = SlotCandidate {
            doctor_id: request.doctor_id,
            date: request.date,
            time,
            duration_minutes,
            exclude_booking_id: None,
        };

        let _guard = self.write_gate.lock().await;

        let existing = self
            .store
            .bookings_for_day(request.doctor_id, request.date)
            .await;

        match allocator::check_conflict(&existing, &candidate)? {
            AvailabilityResult::Conflict { conflicting } => {
                warn!(
                    "Rejecting booking for doctor {} on {} at {}: slot taken by {}",
                    request.doctor_id, request.date, time, conflicting.id
                );
                Err(SchedulingError::SlotTaken {
                    conflicting: Box::new(conflicting),
                })
            }
            AvailabilityResult::Available => {
                let now = Utc::now();
                let booking = Booking {
                    id: Uuid::new_v4(),
                    doctor_id: request.doctor_id,
                    date: request.date,
                    time,
                    status: BookingStatus::Scheduled,
                    duration_minutes,
                    created_at: now,
                    updated_at: now,
                };
                self.store.insert(booking.clone()).await;
                info!(
                    "Booking {} created for doctor {} on {} at {}",
                    booking.id, booking.doctor_id, booking.date, booking.time
                );
                Ok(booking)
            }
        }
    }

    /// Move an existing booking to a new slot. The booking being moved is
    /// excluded from the conflict check so it cannot collide with itself.
    pub async fn reschedule(
        &self,
        booking_id: Uuid,
        request: RescheduleBookingRequest,
    ) -> Result<Booking, SchedulingError> {
        let new_time = allocator::parse_slot_time(&request.new_time)?;

        let _guard = self.write_gate.lock().await;

        let mut booking = self
            .store
            .get(booking_id)
            .await
            .ok_or(SchedulingError::NotFound)?;

        if booking.status.is_terminal() {
            return Err(SchedulingError::InvalidStatusTransition(booking.status));
        }

        let new_date = request.new_date.unwrap_or(booking.date);
        let duration_minutes = match request.new_duration_minutes {
            Some(_) => self.resolve_duration(request.new_duration_minutes)?,
            None => booking.duration_minutes,
        };

        let candidate = SlotCandidate {
            doctor_id: booking.doctor_id,
            date: new_date,
            time: new_time,
            duration_minutes,
            exclude_booking_id: Some(booking.id),
        };

        let existing = self
            .store
            .bookings_for_day(booking.doctor_id, new_date)
            .await;

        if let AvailabilityResult::Conflict { conflicting } =
            allocator::check_conflict(&existing, &candidate)?
        {
            return Err(SchedulingError::SlotTaken {
                conflicting: Box::new(conflicting),
            });
        }

        booking.date = new_date;
        booking.time = new_time;
        booking.duration_minutes = duration_minutes;
        booking.updated_at = Utc::now();

        if !self.store.update(booking.clone()).await {
            return Err(SchedulingError::NotFound);
        }

        info!(
            "Booking {} rescheduled to {} at {}",
            booking.id, booking.date, booking.time
        );
        Ok(booking)
    }

    /// Cancel a booking, freeing its slot for later candidates.
    pub async fn cancel(&self, booking_id: Uuid) -> Result<Booking, SchedulingError> {
        self.update_status(booking_id, BookingStatus::Cancelled).await
    }

    /// Apply a status transition (confirm, start, complete, no-show, cancel).
    pub async fn update_status(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
    ) -> Result<Booking, SchedulingError> {
        let _guard = self.write_gate.lock().await;

        let mut booking = self
            .store
            .get(booking_id)
            .await
            .ok_or(SchedulingError::NotFound)?;

        if !booking.status.can_transition_to(&new_status) {
            return Err(SchedulingError::InvalidStatusTransition(booking.status));
        }

        booking.status = new_status;
        booking.updated_at = Utc::now();

        if !self.store.update(booking.clone()).await {
            return Err(SchedulingError::NotFound);
        }

        info!("Booking {} moved to status {}", booking.id, booking.status);
        Ok(booking)
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> Result<Booking, SchedulingError> {
        self.store
            .get(booking_id)
            .await
            .ok_or(SchedulingError::NotFound)
    }

    /// Read-only point availability query.
    pub async fn check(
        &self,
        candidate: &SlotCandidate,
    ) -> Result<AvailabilityResult, SchedulingError> {
        let existing = self
            .store
            .bookings_for_day(candidate.doctor_id, candidate.date)
            .await;
        allocator::check_conflict(&existing, candidate)
    }

    /// Free slot start times for one doctor on one date, as `HH:MM` strings.
    pub async fn available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        hours: &WorkingHours,
    ) -> Result<Vec<String>, SchedulingError> {
        let existing = self.store.bookings_for_day(doctor_id, date).await;
        let slots: Vec<String> = allocator::free_slots(&existing, hours, date)?
            .map(allocator::format_slot)
            .collect();

        debug!(
            "Doctor {} has {} free slots on {}",
            doctor_id,
            slots.len(),
            date
        );
        Ok(slots)
    }

    fn resolve_duration(&self, requested: Option<i32>) -> Result<i32, SchedulingError> {
        let duration = requested.unwrap_or(self.rules.default_duration_minutes);
        if duration < self.rules.min_duration_minutes || duration > self.rules.max_duration_minutes
        {
            return Err(SchedulingError::Validation(format!(
                "Booking duration must be between {} and {} minutes",
                self.rules.min_duration_minutes, self.rules.max_duration_minutes
            )));
        }
        Ok(duration)
    }
}
