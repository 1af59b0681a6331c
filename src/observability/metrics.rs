//! Metrics collection and exposition.
//!
//! # Metrics
//! - `resource_requests_total` (counter): requests by resource, method, status
//! - `resource_request_duration_seconds` (histogram): time to response head
//! - `resource_stream_items_total` (counter): collection items written
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; exporting is opt-in
//! - Labels for resource, method, status code

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Record one finished request.
pub fn record_request(resource: &str, method: &str, status: u16, start: Instant) {
    counter!(
        "resource_requests_total",
        "resource" => resource.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        "resource_request_duration_seconds",
        "resource" => resource.to_string(),
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one collection item handed to the encoder.
pub fn record_stream_item(resource: &str) {
    counter!("resource_stream_items_total", "resource" => resource.to_string()).increment(1);
}
