//! Prometheus metrics.

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "vod_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "vod_http_request_duration_seconds";

    // Pipeline metrics
    pub const MESSAGES_RECEIVED_TOTAL: &str = "vod_messages_received_total";
    pub const MESSAGES_MALFORMED_TOTAL: &str = "vod_messages_malformed_total";
    pub const MESSAGES_DELETED_TOTAL: &str = "vod_messages_deleted_total";
    pub const JOBS_DISPATCHED_TOTAL: &str = "vod_jobs_dispatched_total";
    pub const DISPATCH_FAILURES_TOTAL: &str = "vod_dispatch_failures_total";
    pub const QUEUE_RECEIVE_FAILURES_TOTAL: &str = "vod_queue_receive_failures_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// HTTP metrics middleware.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}
