//! Prometheus metric names and recording helpers.

use std::time::Duration;

use metrics::{counter, histogram};

pub const UPLOADS_TOTAL: &str = "tsv_uploads_total";
pub const UPLOAD_FAILURES_TOTAL: &str = "tsv_upload_failures_total";
pub const TIMESERIES_REQUESTS_TOTAL: &str = "tsv_timeseries_requests_total";
pub const TIMESERIES_ERRORS_TOTAL: &str = "tsv_timeseries_errors_total";
pub const UPLOAD_DURATION_SECONDS: &str = "tsv_upload_duration_seconds";
pub const EXTRACT_DURATION_SECONDS: &str = "tsv_extract_duration_seconds";

pub fn record_upload(elapsed: Duration) {
    counter!(UPLOADS_TOTAL).increment(1);
    histogram!(UPLOAD_DURATION_SECONDS).record(elapsed.as_secs_f64());
}

pub fn record_upload_failure(kind: &'static str) {
    counter!(UPLOAD_FAILURES_TOTAL, "kind" => kind).increment(1);
}

/// Count a query; `endpoint` is `json` or `csv`.
pub fn record_timeseries_request(endpoint: &'static str, elapsed: Duration) {
    counter!(TIMESERIES_REQUESTS_TOTAL, "endpoint" => endpoint).increment(1);
    histogram!(EXTRACT_DURATION_SECONDS, "endpoint" => endpoint).record(elapsed.as_secs_f64());
}

pub fn record_timeseries_error(endpoint: &'static str, kind: &'static str) {
    counter!(TIMESERIES_ERRORS_TOTAL, "endpoint" => endpoint, "kind" => kind).increment(1);
}
