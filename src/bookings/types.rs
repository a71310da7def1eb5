//! Booking records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Holds the room and counts toward the weekly cap.
    Active,
    Cancelled,
    /// The user did not show up.
    Missed,
}

/// A stored reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: String,
    pub room_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    /// Set when a late cancellation was counted as a miss.
    pub penalized: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Active
    }
}

/// A user's penalty state as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStanding {
    pub user_id: String,
    pub missed_this_month: usize,
    pub block_start: Option<DateTime<Utc>>,
    pub blocked: bool,
    /// Present only while the block is in force and its end is representable.
    pub blocked_until: Option<DateTime<Utc>>,
}
