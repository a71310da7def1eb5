//! Booking rule evaluation.
//!
//! # Data Flow
//! ```text
//! BookingRequest + UserHistory snapshot + policy snapshot + now
//!     → evaluator.rs (fail-fast checks)
//!     → Ok(()) or Rejection
//! ```
//!
//! Check order: TooFarInAdvance, TooSoon, DurationMismatch,
//! WeeklyLimitExceeded, UserBlocked.

pub mod evaluator;
pub mod types;

pub use evaluator::{classify_cancellation, evaluate_booking, is_blocked};
pub use types::{BookingRequest, CancellationOutcome, Rejection, UserHistory};
