//! Metrics collection and exposition.
//!
//! # Metrics
//! - `user_api_requests_total` (counter): requests by route and status
//! - `user_api_request_duration_seconds` (histogram): handler latency
//! - `user_api_upstream_calls_total` (counter): management calls by operation and outcome
//! - `user_api_upstream_call_duration_seconds` (histogram): management call latency
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &str, status: u16, start: Instant) {
    let labels = [
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("user_api_requests_total", &labels).increment(1);
    metrics::histogram!("user_api_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_call(operation: &'static str, success: bool, start: Instant) {
    let outcome = if success { "ok" } else { "error" };
    metrics::counter!(
        "user_api_upstream_calls_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("user_api_upstream_call_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}
