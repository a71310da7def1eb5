//! Booking policy document.
//!
//! The JSON shape mirrors the document the frontend edits:
//! `{ booking: {...}, cancellation: {...}, penalty: {...} }` in camelCase.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The singleton booking/cancellation/penalty policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BookingPolicy {
    pub booking: BookingRules,
    pub cancellation: CancellationRules,
    pub penalty: PenaltyRules,
}

/// Admission rules for new bookings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingRules {
    /// How many days ahead a slot becomes bookable.
    pub open_days_before: u32,

    /// Fixed duration of a bookable slot. Always > 0.
    pub slot_duration_hours: u32,

    /// Per-user cap on bookings starting in the same ISO week.
    pub max_bookings_per_week: u32,

    /// Minimum lead time between booking and slot start.
    pub min_booking_time_before_hours: u32,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            open_days_before: 7,
            slot_duration_hours: 2,
            max_bookings_per_week: 3,
            min_booking_time_before_hours: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CancellationRules {
    /// Cancelling closer than this to slot start counts as a miss.
    pub min_cancellation_time_before_minutes: u32,
}

impl Default for CancellationRules {
    fn default() -> Self {
        Self {
            min_cancellation_time_before_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PenaltyRules {
    /// Misses in the trailing month that trigger a block.
    pub max_missed_bookings_per_month: u32,

    /// Length of the booking suspension.
    pub block_duration_weeks: u32,
}

impl Default for PenaltyRules {
    fn default() -> Self {
        Self {
            max_missed_bookings_per_month: 3,
            block_duration_weeks: 2,
        }
    }
}

impl BookingPolicy {
    pub fn open_window(&self) -> Duration {
        Duration::days(i64::from(self.booking.open_days_before))
    }

    pub fn slot_duration(&self) -> Duration {
        Duration::hours(i64::from(self.booking.slot_duration_hours))
    }

    pub fn min_lead_time(&self) -> Duration {
        Duration::hours(i64::from(self.booking.min_booking_time_before_hours))
    }

    pub fn min_cancellation_lead_time(&self) -> Duration {
        Duration::minutes(i64::from(
            self.cancellation.min_cancellation_time_before_minutes,
        ))
    }

    pub fn block_duration(&self) -> Duration {
        Duration::weeks(i64::from(self.penalty.block_duration_weeks))
    }
}

/// A policy together with its concurrency token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDocument {
    #[serde(flatten)]
    pub policy: BookingPolicy,

    /// Incremented on every successful write. 0 means never written.
    pub version: u64,

    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self {
            policy: BookingPolicy::default(),
            version: 0,
            updated_at: None,
        }
    }
}

/// Partial update of the policy. Absent fields keep their stored value.
///
/// Numbers are kept as raw JSON numbers so that negative and fractional
/// values are reported as invalid config rather than as a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicyPatch {
    pub booking: Option<BookingRulesPatch>,
    pub cancellation: Option<CancellationRulesPatch>,
    pub penalty: Option<PenaltyRulesPatch>,

    /// Expected current version; the write is rejected when it differs.
    pub version: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingRulesPatch {
    pub open_days_before: Option<serde_json::Number>,
    pub slot_duration_hours: Option<serde_json::Number>,
    pub max_bookings_per_week: Option<serde_json::Number>,
    pub min_booking_time_before_hours: Option<serde_json::Number>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CancellationRulesPatch {
    pub min_cancellation_time_before_minutes: Option<serde_json::Number>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PenaltyRulesPatch {
    pub max_missed_bookings_per_month: Option<serde_json::Number>,
    pub block_duration_weeks: Option<serde_json::Number>,
}
