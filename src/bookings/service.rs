//! Booking operations: admission, cancellation and no-shows.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::bookings::ledger::BookingLedger;
use crate::bookings::penalties::PenaltyTracker;
use crate::bookings::types::{Booking, BookingStatus, UserStanding};
use crate::clock::Clock;
use crate::observability::metrics;
use crate::policy::PolicyStore;
use crate::rules::{classify_cancellation, evaluate_booking, BookingRequest, Rejection, UserHistory};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("booking rejected: {0}")]
    Rejected(Rejection),

    #[error("room is already booked for an overlapping time")]
    SlotUnavailable,

    #[error("booking not found")]
    NotFound,

    #[error("booking is no longer active")]
    NotActive,

    #[error("booking has not started yet")]
    NotStarted,
}

/// Result of a cancellation.
#[derive(Debug, Clone)]
pub struct Cancellation {
    pub booking: Booking,
    pub penalized: bool,
    /// True when this cancellation started a penalty block.
    pub blocked: bool,
}

pub struct BookingService {
    ledger: BookingLedger,
    penalties: PenaltyTracker,
    policy: Arc<PolicyStore>,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    pub fn new(policy: Arc<PolicyStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger: BookingLedger::new(),
            penalties: PenaltyTracker::new(),
            policy,
            clock,
        }
    }

    /// Evaluate `request` against the current policy and reserve the slot.
    pub fn book(&self, request: BookingRequest) -> Result<Booking, BookingError> {
        let request = BookingRequest {
            user_id: request.user_id.trim().to_string(),
            room_id: request.room_id.trim().to_string(),
            ..request
        };
        if request.user_id.is_empty() {
            return Err(BookingError::MissingField { field: "userId" });
        }
        if request.room_id.is_empty() {
            return Err(BookingError::MissingField { field: "roomId" });
        }

        let now = self.clock.now();
        let policy = self.policy.get();

        let lock = self.ledger.user_lock(&request.user_id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let history = UserHistory {
            active_starts: self.ledger.active_starts(&request.user_id),
            block_start: self.penalties.block_start(&request.user_id),
        };

        if let Err(rejection) = evaluate_booking(&policy.policy, now, &request, &history) {
            tracing::info!(
                user_id = %request.user_id,
                room_id = %request.room_id,
                kind = %rejection,
                "Booking rejected by policy"
            );
            metrics::record_policy_rejection(rejection.as_str());
            metrics::record_booking("rejected");
            return Err(BookingError::Rejected(rejection));
        }

        let Some(booking) = self.ledger.reserve(&request, now) else {
            tracing::info!(
                user_id = %request.user_id,
                room_id = %request.room_id,
                start = %request.start_time,
                "Slot unavailable"
            );
            metrics::record_booking("conflict");
            return Err(BookingError::SlotUnavailable);
        };

        tracing::info!(
            booking_id = %booking.id,
            user_id = %booking.user_id,
            room_id = %booking.room_id,
            start = %booking.start_time,
            "Booking created"
        );
        metrics::record_booking("created");
        Ok(booking)
    }

    /// Cancel an active booking, counting a miss if it is too late.
    pub fn cancel(&self, id: Uuid) -> Result<Cancellation, BookingError> {
        let existing = self.ledger.get(id).ok_or(BookingError::NotFound)?;

        let lock = self.ledger.user_lock(&existing.user_id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let now = self.clock.now();
        let policy = self.policy.get();
        let penalized = classify_cancellation(&policy.policy, now, existing.start_time).is_penalized();

        let booking = self
            .ledger
            .close(id, BookingStatus::Cancelled, penalized, now)
            .ok_or(BookingError::NotActive)?;

        let blocked = penalized && self.penalties.record_miss(&booking.user_id, now, &policy.policy);

        tracing::info!(
            booking_id = %booking.id,
            user_id = %booking.user_id,
            penalized,
            "Booking cancelled"
        );
        metrics::record_booking(if penalized { "cancelled_late" } else { "cancelled" });
        Ok(Cancellation {
            booking,
            penalized,
            blocked,
        })
    }

    /// Mark a started booking as a no-show.
    pub fn mark_missed(&self, id: Uuid) -> Result<Booking, BookingError> {
        let existing = self.ledger.get(id).ok_or(BookingError::NotFound)?;

        let lock = self.ledger.user_lock(&existing.user_id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let now = self.clock.now();
        if !existing.is_active() {
            return Err(BookingError::NotActive);
        }
        if existing.start_time > now {
            return Err(BookingError::NotStarted);
        }

        let policy = self.policy.get();
        let booking = self
            .ledger
            .close(id, BookingStatus::Missed, false, now)
            .ok_or(BookingError::NotActive)?;
        self.penalties.record_miss(&booking.user_id, now, &policy.policy);

        tracing::info!(booking_id = %booking.id, user_id = %booking.user_id, "Booking marked as missed");
        metrics::record_booking("missed");
        Ok(booking)
    }

    pub fn get(&self, id: Uuid) -> Result<Booking, BookingError> {
        self.ledger.get(id).ok_or(BookingError::NotFound)
    }

    pub fn list(&self, user_id: Option<&str>) -> Vec<Booking> {
        self.ledger.list(user_id)
    }

    pub fn standing(&self, user_id: &str) -> UserStanding {
        let policy = self.policy.get();
        self.penalties.standing(user_id, self.clock.now(), &policy.policy)
    }
}
