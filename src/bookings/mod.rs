//! Room reservations and no-show penalties.
//!
//! # Data Flow
//! ```text
//! POST /bookings
//!     → service.rs (user critical section)
//!     → rules::evaluate_booking (policy snapshot, history snapshot)
//!     → ledger.rs (room claim, conditional on no overlap)
//!
//! DELETE /bookings/:id, POST /bookings/:id/no-show
//!     → service.rs (classify cancellation)
//!     → ledger.rs (release room)
//!     → penalties.rs (trailing-month misses, block window)
//! ```

pub mod ledger;
pub mod penalties;
pub mod service;
pub mod types;

pub use service::{BookingError, BookingService, Cancellation};
pub use types::{Booking, BookingStatus, UserStanding};
