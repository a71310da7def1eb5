//! Reservation storage with per-room conditional writes.
//!
//! # Design Decisions
//! - Each room has its own schedule behind a mutex; a claim checks for an
//!   overlapping active booking and inserts under the same lock
//! - Each user has a critical section held across evaluate-then-reserve
//! - Lock order is user, then room; the booking map is never touched while
//!   a room lock is held

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::bookings::types::{Booking, BookingStatus};
use crate::rules::BookingRequest;

/// Active bookings in one room, keyed by start time.
#[derive(Debug, Default)]
struct RoomSchedule {
    slots: BTreeMap<DateTime<Utc>, (DateTime<Utc>, Uuid)>,
}

impl RoomSchedule {
    fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        // Slots in a room never overlap each other, so only the latest one
        // starting before `end` can reach into [start, end).
        self.slots
            .range(..end)
            .next_back()
            .is_some_and(|(_, (slot_end, _))| *slot_end > start)
    }

    fn claim(&mut self, start: DateTime<Utc>, end: DateTime<Utc>, id: Uuid) -> bool {
        if self.overlaps(start, end) {
            return false;
        }
        self.slots.insert(start, (end, id));
        true
    }

    fn release(&mut self, start: DateTime<Utc>, id: Uuid) {
        if self.slots.get(&start).is_some_and(|(_, owner)| *owner == id) {
            self.slots.remove(&start);
        }
    }
}

/// All bookings plus the room and user indexes.
#[derive(Default)]
pub struct BookingLedger {
    bookings: DashMap<Uuid, Booking>,
    rooms: DashMap<String, Arc<Mutex<RoomSchedule>>>,
    users: DashMap<String, Arc<Mutex<()>>>,
}

impl BookingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutex serializing every state change for `user_id`.
    pub fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.users.entry(user_id.to_string()).or_default().clone()
    }

    fn room(&self, room_id: &str) -> Arc<Mutex<RoomSchedule>> {
        self.rooms.entry(room_id.to_string()).or_default().clone()
    }

    /// Start times of the user's active bookings.
    pub fn active_starts(&self, user_id: &str) -> Vec<DateTime<Utc>> {
        self.bookings
            .iter()
            .filter(|b| b.user_id == user_id && b.is_active())
            .map(|b| b.start_time)
            .collect()
    }

    /// Claim the room window and store a new active booking.
    ///
    /// Returns `None` when an active booking in the same room overlaps.
    pub fn reserve(&self, request: &BookingRequest, now: DateTime<Utc>) -> Option<Booking> {
        let id = Uuid::new_v4();
        let claimed = {
            let room = self.room(&request.room_id);
            let mut schedule = room.lock().unwrap_or_else(|e| e.into_inner());
            schedule.claim(request.start_time, request.end_time, id)
        };
        if !claimed {
            return None;
        }

        let booking = Booking {
            id,
            user_id: request.user_id.clone(),
            room_id: request.room_id.clone(),
            start_time: request.start_time,
            end_time: request.end_time,
            status: BookingStatus::Active,
            penalized: false,
            created_at: now,
            updated_at: now,
        };
        self.bookings.insert(id, booking.clone());
        Some(booking)
    }

    /// Move an active booking to `status`, freeing its room window.
    ///
    /// Callers hold the owner's critical section.
    pub fn close(&self, id: Uuid, status: BookingStatus, penalized: bool, now: DateTime<Utc>) -> Option<Booking> {
        let booking = self.get(id).filter(Booking::is_active)?;

        {
            let room = self.room(&booking.room_id);
            let mut schedule = room.lock().unwrap_or_else(|e| e.into_inner());
            schedule.release(booking.start_time, id);
        }

        let mut entry = self.bookings.get_mut(&id)?;
        entry.status = status;
        entry.penalized = penalized;
        entry.updated_at = now;
        Some(entry.clone())
    }

    pub fn get(&self, id: Uuid) -> Option<Booking> {
        self.bookings.get(&id).map(|r| r.value().clone())
    }

    /// Bookings sorted by start time, optionally for a single user.
    pub fn list(&self, user_id: Option<&str>) -> Vec<Booking> {
        let mut out: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| user_id.map_or(true, |u| b.user_id == u))
            .map(|r| r.value().clone())
            .collect();
        out.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.created_at.cmp(&b.created_at)));
        out
    }
}
