// libs/scheduling-cell/src/services/allocator.rs
//
// Pure slot-allocation logic. No I/O, no shared state: callers supply the
// relevant bookings and get a decision back. Atomicity of check-then-write
// is the caller's responsibility (see services::booking).
use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, warn};

use crate::models::{
    minute_of_day, AvailabilityResult, Booking, SchedulingError, SlotCandidate, WorkingHours,
    MAX_DURATION_MINUTES, MIN_DURATION_MINUTES,
};

/// Parse a time-of-day in `HH:MM` 24-hour form.
pub fn parse_slot_time(raw: &str) -> Result<NaiveTime, SchedulingError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| SchedulingError::Validation(format!("Invalid time format: {:?}", raw)))
}

/// Render a slot as the `HH:MM` string the availability endpoint returns.
pub fn format_slot(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

fn validate_duration(duration_minutes: i32) -> Result<(), SchedulingError> {
    if duration_minutes <= 0 {
        return Err(SchedulingError::Validation(
            "Booking duration must be positive".to_string(),
        ));
    }
    if duration_minutes < MIN_DURATION_MINUTES || duration_minutes > MAX_DURATION_MINUTES {
        return Err(SchedulingError::Validation(format!(
            "Booking duration must be between {} and {} minutes",
            MIN_DURATION_MINUTES, MAX_DURATION_MINUTES
        )));
    }
    Ok(())
}

/// Check a candidate slot against existing bookings.
///
/// Reports the first active booking for the same doctor and date whose time
/// range intersects the candidate's. Terminal bookings never conflict, and
/// the excluded booking id is skipped entirely so a reschedule does not
/// collide with itself.
///
/// Conflict detection is true interval overlap, not exact start-time
/// equality: a 60-minute booking at 10:00 blocks a 10:15 candidate.
pub fn check_conflict(
    existing: &[Booking],
    candidate: &SlotCandidate,
) -> Result<AvailabilityResult, SchedulingError> {
    validate_duration(candidate.duration_minutes)?;

    let start = minute_of_day(candidate.time);
    let end = start + candidate.duration_minutes;

    debug!(
        "Checking conflicts for doctor {} on {} at {} ({} min)",
        candidate.doctor_id, candidate.date, candidate.time, candidate.duration_minutes
    );

    for booking in existing {
        if candidate.exclude_booking_id == Some(booking.id) {
            continue;
        }
        if booking.doctor_id != candidate.doctor_id || booking.date != candidate.date {
            continue;
        }
        if !booking.status.is_active() {
            continue;
        }

        // Two ranges overlap when start1 < end2 AND start2 < end1
        if start < booking.end_minute() && booking.start_minute() < end {
            warn!(
                "Conflict detected for doctor {} on {}: booking {} at {}",
                candidate.doctor_id, candidate.date, booking.id, booking.time
            );
            return Ok(AvailabilityResult::Conflict {
                conflicting: booking.clone(),
            });
        }
    }

    Ok(AvailabilityResult::Available)
}

/// Lazy sequence of free slot start times within a day's working hours.
///
/// Restartable: the iterator is `Clone`, and building it twice from the same
/// inputs yields the same sequence.
#[derive(Debug, Clone)]
pub struct FreeSlots {
    next_minute: i32,
    end_minute: i32,
    step: i32,
    booked_minutes: Vec<i32>,
}

impl Iterator for FreeSlots {
    type Item = NaiveTime;

    fn next(&mut self) -> Option<NaiveTime> {
        while self.next_minute < self.end_minute {
            let minute = self.next_minute;
            self.next_minute += self.step;
            if !self.booked_minutes.contains(&minute) {
                return Some(time_from_minute(minute));
            }
        }
        None
    }
}

fn time_from_minute(minute: i32) -> NaiveTime {
    // Slot minutes are generated strictly below a NaiveTime end bound, so
    // they always fall within 00:00..24:00.
    NaiveTime::from_hms_opt(minute as u32 / 60, minute as u32 % 60, 0).unwrap()
}

/// Enumerate free slots for one doctor on one date.
///
/// Slots start at `hours.start`, step by `hours.slot_minutes`, and stay
/// strictly below `hours.end`. A slot is removed only when its start time
/// exactly matches the start of an active booking on that date; callers are
/// expected to pass bookings already filtered to the doctor in question.
/// An empty window (`start >= end`) yields an empty sequence, not an error.
pub fn free_slots(
    existing: &[Booking],
    hours: &WorkingHours,
    date: NaiveDate,
) -> Result<FreeSlots, SchedulingError> {
    if hours.slot_minutes <= 0 {
        return Err(SchedulingError::Validation(
            "Slot granularity must be positive".to_string(),
        ));
    }

    let booked_minutes: Vec<i32> = existing
        .iter()
        .filter(|b| b.date == date && b.status.is_active())
        .map(|b| b.start_minute())
        .collect();

    debug!(
        "Enumerating slots on {} between {} and {} ({} booked starts)",
        date,
        hours.start,
        hours.end,
        booked_minutes.len()
    );

    Ok(FreeSlots {
        next_minute: minute_of_day(hours.start),
        end_minute: minute_of_day(hours.end),
        step: hours.slot_minutes,
        booked_minutes,
    })
}
