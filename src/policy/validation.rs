//! Policy validation.
//!
//! # Responsibilities
//! - Coerce patch values to non-negative integers
//! - Bound every field so derived durations stay inside chrono's date range
//! - Check value ranges on the merged document (slot duration > 0)
//!
//! Returns all validation errors, not just the first.

use std::fmt;

use crate::policy::types::{BookingPolicy, PolicyPatch};

/// A single rejected config field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

pub const MAX_OPEN_DAYS_BEFORE: u32 = 3_650;
pub const MAX_SLOT_DURATION_HOURS: u32 = 24;
pub const MAX_BOOKINGS_PER_WEEK: u32 = 1_000;
pub const MAX_MIN_BOOKING_TIME_BEFORE_HOURS: u32 = 8_760;
pub const MAX_MIN_CANCELLATION_TIME_BEFORE_MINUTES: u32 = 525_600;
pub const MAX_MISSED_BOOKINGS_PER_MONTH: u32 = 1_000;
pub const MAX_BLOCK_DURATION_WEEKS: u32 = 520;

const OUT_OF_RANGE: &str = "is out of range";

fn coerce(
    field: &'static str,
    value: Option<&serde_json::Number>,
    max: u32,
    target: &mut u32,
    errors: &mut Vec<FieldError>,
) {
    let Some(value) = value else { return };

    match value.as_i64() {
        Some(n) if n < 0 => errors.push(FieldError {
            field,
            reason: "must not be negative",
        }),
        Some(n) => match u32::try_from(n) {
            Ok(n) if n <= max => *target = n,
            _ => errors.push(FieldError {
                field,
                reason: OUT_OF_RANGE,
            }),
        },
        None if value.is_u64() => errors.push(FieldError {
            field,
            reason: OUT_OF_RANGE,
        }),
        None => errors.push(FieldError {
            field,
            reason: "must be an integer",
        }),
    }
}

/// Merge `patch` onto `base`, returning the full resulting policy.
pub fn apply_patch(base: &BookingPolicy, patch: &PolicyPatch) -> Result<BookingPolicy, Vec<FieldError>> {
    let mut merged = base.clone();
    let mut errors = Vec::new();

    if let Some(b) = &patch.booking {
        let rules = &mut merged.booking;
        coerce(
            "booking.openDaysBefore",
            b.open_days_before.as_ref(),
            MAX_OPEN_DAYS_BEFORE,
            &mut rules.open_days_before,
            &mut errors,
        );
        coerce(
            "booking.slotDurationHours",
            b.slot_duration_hours.as_ref(),
            MAX_SLOT_DURATION_HOURS,
            &mut rules.slot_duration_hours,
            &mut errors,
        );
        coerce(
            "booking.maxBookingsPerWeek",
            b.max_bookings_per_week.as_ref(),
            MAX_BOOKINGS_PER_WEEK,
            &mut rules.max_bookings_per_week,
            &mut errors,
        );
        coerce(
            "booking.minBookingTimeBeforeHours",
            b.min_booking_time_before_hours.as_ref(),
            MAX_MIN_BOOKING_TIME_BEFORE_HOURS,
            &mut rules.min_booking_time_before_hours,
            &mut errors,
        );
    }

    if let Some(c) = &patch.cancellation {
        coerce(
            "cancellation.minCancellationTimeBeforeMinutes",
            c.min_cancellation_time_before_minutes.as_ref(),
            MAX_MIN_CANCELLATION_TIME_BEFORE_MINUTES,
            &mut merged.cancellation.min_cancellation_time_before_minutes,
            &mut errors,
        );
    }

    if let Some(p) = &patch.penalty {
        let rules = &mut merged.penalty;
        coerce(
            "penalty.maxMissedBookingsPerMonth",
            p.max_missed_bookings_per_month.as_ref(),
            MAX_MISSED_BOOKINGS_PER_MONTH,
            &mut rules.max_missed_bookings_per_month,
            &mut errors,
        );
        coerce(
            "penalty.blockDurationWeeks",
            p.block_duration_weeks.as_ref(),
            MAX_BLOCK_DURATION_WEEKS,
            &mut rules.block_duration_weeks,
            &mut errors,
        );
    }

    if errors.is_empty() {
        errors.extend(validate_policy(&merged));
    }

    if errors.is_empty() {
        Ok(merged)
    } else {
        Err(errors)
    }
}

/// Semantic checks on a complete policy, e.g. one loaded from disk.
pub fn validate_policy(policy: &BookingPolicy) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if policy.booking.slot_duration_hours == 0 {
        errors.push(FieldError {
            field: "booking.slotDurationHours",
            reason: "must be greater than zero",
        });
    }

    let bounds = [
        ("booking.openDaysBefore", policy.booking.open_days_before, MAX_OPEN_DAYS_BEFORE),
        ("booking.slotDurationHours", policy.booking.slot_duration_hours, MAX_SLOT_DURATION_HOURS),
        ("booking.maxBookingsPerWeek", policy.booking.max_bookings_per_week, MAX_BOOKINGS_PER_WEEK),
        (
            "booking.minBookingTimeBeforeHours",
            policy.booking.min_booking_time_before_hours,
            MAX_MIN_BOOKING_TIME_BEFORE_HOURS,
        ),
        (
            "cancellation.minCancellationTimeBeforeMinutes",
            policy.cancellation.min_cancellation_time_before_minutes,
            MAX_MIN_CANCELLATION_TIME_BEFORE_MINUTES,
        ),
        (
            "penalty.maxMissedBookingsPerMonth",
            policy.penalty.max_missed_bookings_per_month,
            MAX_MISSED_BOOKINGS_PER_MONTH,
        ),
        ("penalty.blockDurationWeeks", policy.penalty.block_duration_weeks, MAX_BLOCK_DURATION_WEEKS),
    ];
    errors.extend(
        bounds
            .into_iter()
            .filter(|(_, value, max)| value > max)
            .map(|(field, _, _)| FieldError {
                field,
                reason: OUT_OF_RANGE,
            }),
    );
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(json: &str) -> PolicyPatch {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_patch_preserves_unspecified_fields() {
        let base = BookingPolicy::default();
        let merged = apply_patch(&base, &patch(r#"{"booking":{"maxBookingsPerWeek":9}}"#)).unwrap();

        assert_eq!(merged.booking.max_bookings_per_week, 9);
        assert_eq!(merged.booking.open_days_before, base.booking.open_days_before);
        assert_eq!(merged.cancellation, base.cancellation);
        assert_eq!(merged.penalty, base.penalty);
    }

    #[test]
    fn test_rejects_negative_and_fractional_values() {
        let base = BookingPolicy::default();
        let errors = apply_patch(
            &base,
            &patch(r#"{"booking":{"openDaysBefore":-1},"penalty":{"blockDurationWeeks":1.5}}"#),
        )
        .unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "booking.openDaysBefore");
        assert_eq!(errors[0].reason, "must not be negative");
        assert_eq!(errors[1].field, "penalty.blockDurationWeeks");
        assert_eq!(errors[1].reason, "must be an integer");
    }

    #[test]
    fn test_rejects_zero_slot_duration() {
        let errors = apply_patch(
            &BookingPolicy::default(),
            &patch(r#"{"booking":{"slotDurationHours":0}}"#),
        )
        .unwrap_err();
        assert_eq!(errors[0].field, "booking.slotDurationHours");
    }

    #[test]
    fn test_rejects_out_of_range() {
        let errors = apply_patch(
            &BookingPolicy::default(),
            &patch(r#"{"cancellation":{"minCancellationTimeBeforeMinutes":99999999999}}"#),
        )
        .unwrap_err();
        assert_eq!(errors[0].reason, "is out of range");
    }

    #[test]
    fn test_block_duration_beyond_limit_rejected() {
        let errors = apply_patch(
            &BookingPolicy::default(),
            &patch(r#"{"penalty":{"maxMissedBookingsPerMonth":1,"blockDurationWeeks":4294967295}}"#),
        )
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "penalty.blockDurationWeeks");
        assert_eq!(errors[0].reason, "is out of range");

        let at_limit = apply_patch(
            &BookingPolicy::default(),
            &patch(r#"{"penalty":{"blockDurationWeeks":520}}"#),
        )
        .unwrap();
        assert_eq!(at_limit.penalty.block_duration_weeks, MAX_BLOCK_DURATION_WEEKS);
    }

    #[test]
    fn test_loaded_policy_bounds_checked() {
        let mut policy = BookingPolicy::default();
        policy.booking.open_days_before = u32::MAX;
        policy.cancellation.min_cancellation_time_before_minutes = u32::MAX;

        let fields: Vec<_> = validate_policy(&policy).into_iter().map(|e| e.field).collect();
        assert_eq!(fields, ["booking.openDaysBefore", "cancellation.minCancellationTimeBeforeMinutes"]);
    }

    #[test]
    fn test_zero_is_allowed_where_non_negative() {
        let merged = apply_patch(
            &BookingPolicy::default(),
            &patch(r#"{"booking":{"minBookingTimeBeforeHours":0},"penalty":{"blockDurationWeeks":0}}"#),
        )
        .unwrap();
        assert_eq!(merged.booking.min_booking_time_before_hours, 0);
        assert_eq!(merged.penalty.block_duration_weeks, 0);
    }
}
