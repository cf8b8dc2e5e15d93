//! Metrics collection.
//!
//! # Metrics
//! - `routekit_requests_total` (counter): settled requests by method, status
//! - `routekit_request_duration_seconds` (histogram): transport latency
//!
//! # Design Decisions
//! - Emitted through the `metrics` facade; no exporter is bundled
//! - Requests that never got a response use the status label `none`

use std::time::Duration;

/// Record one settled request.
pub fn record_request(method: &str, status: Option<u16>, latency: Duration) {
    let status = status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "none".to_string());

    ::metrics::counter!(
        "routekit_requests_total",
        "method" => method.to_string(),
        "status" => status.clone()
    )
    .increment(1);

    ::metrics::histogram!(
        "routekit_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status
    )
    .record(latency.as_secs_f64());
}
