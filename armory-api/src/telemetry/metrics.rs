//! Prometheus Metrics Definitions
//!
//! Defines the armory metrics with their labels and exposes a /metrics
//! endpoint for Prometheus scraping.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds). Spreadsheet round trips are
/// slow, so the upper buckets matter more than usual.
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Global metrics instance - initialized once at startup
pub static METRICS: Lazy<ApiResult<ArmoryMetrics>> = Lazy::new(ArmoryMetrics::new);

#[derive(Clone)]
pub struct ArmoryMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Ledger operation counter - labels: operation, outcome
    pub ledger_operations_total: CounterVec,
}

impl ArmoryMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "armory_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_requests_total: {}", e)))?,

            http_request_duration_seconds: register_histogram_vec!(
                "armory_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_request_duration_seconds: {}", e)))?,

            ledger_operations_total: register_counter_vec!(
                "armory_ledger_operations_total",
                "Total ledger operations by outcome",
                &["operation", "outcome"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register ledger_operations_total: {}", e)))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    pub fn record_ledger_operation(&self, operation: &str, outcome: &str) {
        self.ledger_operations_total
            .with_label_values(&[operation, outcome])
            .inc();
    }
}

/// Outcome label for an operation result: `success`, `rejected` for client
/// errors, `error` otherwise.
pub fn outcome_label<T>(result: &ApiResult<T>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(e) if e.status_code().is_client_error() => "rejected",
        Err(_) => "error",
    }
}

/// Count one ledger operation. Metrics that failed to register are skipped.
pub fn record_operation<T>(operation: &str, result: &ApiResult<T>) {
    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_ledger_operation(operation, outcome_label(result));
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_http_request() -> Result<(), String> {
        let metrics = METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))?;
        metrics.record_http_request("POST", "/send-item", 200, 0.42);
        Ok(())
    }

    #[test]
    fn test_record_operation_counts_by_outcome() -> Result<(), String> {
        let metrics = METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))?;
        let before = metrics
            .ledger_operations_total
            .with_label_values(&["test_op", "rejected"])
            .get();

        let rejected: ApiResult<()> = Err(ApiError::missing_field("serial_number"));
        record_operation("test_op", &rejected);

        let after = metrics
            .ledger_operations_total
            .with_label_values(&["test_op", "rejected"])
            .get();
        assert_eq!(after - before, 1.0);
        Ok(())
    }

    #[test]
    fn test_outcome_labels() {
        let ok: ApiResult<()> = Ok(());
        assert_eq!(outcome_label(&ok), "success");
        let down: ApiResult<()> = Err(ApiError::store_unavailable("timeout"));
        assert_eq!(outcome_label(&down), "error");
        let conflict: ApiResult<()> = Err(ApiError::already_assigned("Dana", "ACOG", "A7"));
        assert_eq!(outcome_label(&conflict), "rejected");
    }
}
