//! Inputs and outputs of rule evaluation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A proposed reservation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub user_id: String,
    pub room_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// What the evaluator needs to know about the requesting user.
#[derive(Debug, Clone, Default)]
pub struct UserHistory {
    /// Start times of the user's active bookings.
    pub active_starts: Vec<DateTime<Utc>>,

    /// When the current (or most recent) penalty block began.
    pub block_start: Option<DateTime<Utc>>,
}

/// Why a booking was refused. Variants are listed in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rejection {
    TooFarInAdvance,
    TooSoon,
    DurationMismatch,
    WeeklyLimitExceeded,
    UserBlocked,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::TooFarInAdvance => "TooFarInAdvance",
            Rejection::TooSoon => "TooSoon",
            Rejection::DurationMismatch => "DurationMismatch",
            Rejection::WeeklyLimitExceeded => "WeeklyLimitExceeded",
            Rejection::UserBlocked => "UserBlocked",
        }
    }

    /// Human-readable explanation returned to clients.
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::TooFarInAdvance => "Slot is not open for booking yet",
            Rejection::TooSoon => "Slot starts too soon to be booked",
            Rejection::DurationMismatch => "Booking length does not match the slot duration",
            Rejection::WeeklyLimitExceeded => "Weekly booking limit reached",
            Rejection::UserBlocked => "Booking privileges are suspended",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationOutcome {
    Free,
    Penalized,
}

impl CancellationOutcome {
    pub fn is_penalized(&self) -> bool {
        matches!(self, CancellationOutcome::Penalized)
    }
}
