//! Admission and cancellation rules.
//!
//! Pure functions of `(policy, now, request, history)`. Checks run in a fixed
//! order and the first failure wins.

use chrono::{DateTime, Datelike, Utc};

use crate::policy::BookingPolicy;
use crate::rules::types::{BookingRequest, CancellationOutcome, Rejection, UserHistory};

/// Decide whether `request` may be booked at `now`.
pub fn evaluate_booking(
    policy: &BookingPolicy,
    now: DateTime<Utc>,
    request: &BookingRequest,
    history: &UserHistory,
) -> Result<(), Rejection> {
    let lead = request.start_time - now;

    if lead > policy.open_window() {
        return Err(Rejection::TooFarInAdvance);
    }

    if lead < policy.min_lead_time() {
        return Err(Rejection::TooSoon);
    }

    if request.end_time - request.start_time != policy.slot_duration() {
        return Err(Rejection::DurationMismatch);
    }

    let same_week = history
        .active_starts
        .iter()
        .filter(|start| same_iso_week(**start, request.start_time))
        .count();
    if same_week >= policy.booking.max_bookings_per_week as usize {
        return Err(Rejection::WeeklyLimitExceeded);
    }

    if is_blocked(policy, now, history.block_start) {
        return Err(Rejection::UserBlocked);
    }

    Ok(())
}

/// Classify a cancellation made at `now` for a slot starting at `start_time`.
pub fn classify_cancellation(
    policy: &BookingPolicy,
    now: DateTime<Utc>,
    start_time: DateTime<Utc>,
) -> CancellationOutcome {
    if start_time - now < policy.min_cancellation_lead_time() {
        CancellationOutcome::Penalized
    } else {
        CancellationOutcome::Free
    }
}

/// End of the block that began at `block_start`, or `None` when it lies past
/// the last representable instant.
pub fn block_end(policy: &BookingPolicy, block_start: DateTime<Utc>) -> Option<DateTime<Utc>> {
    block_start.checked_add_signed(policy.block_duration())
}

/// True while a block that began at `block_start` is still in force. A block
/// whose end is unrepresentable never expires.
pub fn is_blocked(policy: &BookingPolicy, now: DateTime<Utc>, block_start: Option<DateTime<Utc>>) -> bool {
    block_start.is_some_and(|start| block_end(policy, start).map_or(true, |end| end > now))
}

fn same_iso_week(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.iso_week() == b.iso_week()
}
