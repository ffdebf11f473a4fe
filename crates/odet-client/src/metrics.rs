//! Request metrics for the inference client.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const INFERENCE_REQUESTS_TOTAL: &str = "odet_inference_requests_total";
    pub const INFERENCE_REQUEST_DURATION_SECONDS: &str = "odet_inference_request_duration_seconds";
}

/// Record one request to the inference service.
///
/// `outcome` is `"ok"` or a [`ClientError::kind`](crate::ClientError::kind) label.
pub fn record_request(endpoint: &'static str, outcome: &'static str, duration_secs: f64) {
    let labels = [("endpoint", endpoint), ("outcome", outcome)];

    counter!(names::INFERENCE_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::INFERENCE_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}
