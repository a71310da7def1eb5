//! LabBooker: room reservation backend with policy-driven admission.

pub mod bookings;
pub mod clock;
pub mod config;
pub mod http;
pub mod issues;
pub mod lifecycle;
pub mod observability;
pub mod policy;
pub mod rules;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
