//! Booking policy (the singleton config document).
//!
//! # Data Flow
//! ```text
//! PUT /config body
//!     → types.rs (PolicyPatch, raw JSON numbers)
//!     → validation.rs (coerce, range checks, all errors at once)
//!     → store.rs (version check under write lock)
//!     → atomic swap of Arc<PolicyDocument>
//!     → rule evaluation reads the new snapshot
//! ```

pub mod store;
pub mod types;
pub mod validation;

pub use store::{PolicyError, PolicyStore};
pub use types::{BookingPolicy, PolicyDocument, PolicyPatch};
