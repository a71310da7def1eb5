//! Metrics collection and exposition.
//!
//! # Metrics
//! - `labbooker_requests_total` (counter): requests by method, status
//! - `labbooker_request_duration_seconds` (histogram): latency distribution
//! - `labbooker_bookings_total` (counter): booking outcomes
//! - `labbooker_policy_rejections_total` (counter): rejections by rule kind
//! - `labbooker_config_version` (gauge): current policy document version
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    counter!("labbooker_requests_total", "method" => method.to_string(), "status" => status.clone()).increment(1);
    histogram!("labbooker_request_duration_seconds", "method" => method.to_string(), "status" => status)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_booking(outcome: &'static str) {
    counter!("labbooker_bookings_total", "outcome" => outcome).increment(1);
}

pub fn record_policy_rejection(kind: &'static str) {
    counter!("labbooker_policy_rejections_total", "kind" => kind).increment(1);
}

pub fn record_config_version(version: u64) {
    gauge!("labbooker_config_version").set(version as f64);
}
