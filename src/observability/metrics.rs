//! Metrics collection and exposition.
//!
//! # Metrics
//! - `capture_requests_total` (counter): captured requests by method
//! - `capture_attacks_total` (counter): flagged requests by category
//! - `capture_log_evictions_total` (counter): entries dropped per log
//! - `forward_requests_total` (counter): forwards by method and outcome
//! - `forward_duration_seconds` (histogram): outbound call latency
//!
//! Recording is a no-op until a recorder is installed, so library code and
//! tests can call these freely.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

use crate::capture::AttackCategory;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_capture(method: &str) {
    counter!("capture_requests_total", "method" => method.to_string()).increment(1);
}

pub fn record_attack(category: AttackCategory) {
    counter!("capture_attacks_total", "category" => category.label()).increment(1);
}

pub fn record_evictions(log: &'static str, evicted: usize) {
    if evicted > 0 {
        counter!("capture_log_evictions_total", "log" => log).increment(evicted as u64);
    }
}

/// Record the result of one forwarding attempt.
pub fn record_forward(method: &str, outcome: &'static str, start: Instant) {
    counter!(
        "forward_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("forward_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}
