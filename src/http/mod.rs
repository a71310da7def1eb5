//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, span, metrics)
//!     → extract.rs (JSON bodies, record ids)
//!     → handlers/ (config, issues, bookings)
//!     → error.rs (ApiError → status + {msg, kind})
//!     → Send to client
//! ```

pub mod error;
pub mod extract;
pub mod handlers;
pub mod request;
pub mod server;

pub use error::ApiError;
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
