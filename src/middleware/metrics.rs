// ============================================================================
// Prometheus Metrics
// ============================================================================
//
// ## Metrics Collected:
//
// 1. **HTTP Request Duration**
//    - Histogram: sop_http_request_duration_seconds
//    - Labels: method, path, status
//
// 2. **HTTP Request Total**
//    - Counter: sop_http_requests_total
//    - Labels: method, path, status
//
// 3. **Validations**
//    - Counter: sop_validations_total
//    - Labels: outcome (valid, invalid, system_error)
//
// 4. **Compliance Score**
//    - Histogram: sop_compliance_score
//
// 5. **Generation Jobs**
//    - Counter: sop_generation_jobs_total
//    - Labels: status
//
// ## Endpoints:
//
// - GET /metrics - Prometheus scrape endpoint
//
// ============================================================================

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram, register_histogram_vec, CounterVec, Encoder, Histogram, HistogramVec,
    TextEncoder,
};
use std::time::Instant;

use crate::models::sop::SopStatus;
use crate::models::validation::ValidationResult;

// ============================================================================
// PROMETHEUS METRICS REGISTRY
// ============================================================================

lazy_static! {
    /// HTTP request duration histogram
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "sop_http_request_duration_seconds",
        "HTTP request latency in seconds",
        &["method", "path", "status"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]
    ).unwrap();

    /// HTTP request counter
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "sop_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    ).unwrap();

    /// Validation runs by outcome
    pub static ref VALIDATIONS_TOTAL: CounterVec = register_counter_vec!(
        "sop_validations_total",
        "Total number of SOP validation runs",
        &["outcome"]
    ).unwrap();

    /// Distribution of compliance scores
    pub static ref COMPLIANCE_SCORE: Histogram = register_histogram!(
        "sop_compliance_score",
        "Compliance score of validated SOPs",
        vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0]
    ).unwrap();

    /// Finished generation jobs by final status
    pub static ref GENERATION_JOBS_TOTAL: CounterVec = register_counter_vec!(
        "sop_generation_jobs_total",
        "Total number of finished SOP generation jobs",
        &["status"]
    ).unwrap();
}

/// Collapse job ids so paths stay low-cardinality
///
/// Example: /api/sops/550e8400-e29b-41d4-a716-446655440000/validate -> /api/sops/:job_id/validate
fn normalize_path(path: &str) -> String {
    let normalized: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if segment.len() == 36 && segment.contains('-') {
                ":job_id"
            } else if segment.parse::<i64>().is_ok() {
                ":id"
            } else {
                segment
            }
        })
        .collect();

    format!("/{}", normalized.join("/"))
}

// ============================================================================
// METRICS MIDDLEWARE
// ============================================================================

pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = normalize_path(request.uri().path());

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();
    let status_str = status.as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[method.as_str(), &path, &status_str])
        .observe(duration.as_secs_f64());

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), &path, &status_str])
        .inc();

    tracing::debug!(
        target: "metrics",
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        "HTTP request completed"
    );

    response
}

// ============================================================================
// METRICS ENDPOINT HANDLER
// ============================================================================

/// Returns Prometheus-formatted metrics for scraping
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            buffer,
        ),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}

// ============================================================================
// HELPER FUNCTIONS FOR APPLICATION USE
// ============================================================================

fn validation_outcome(result: &ValidationResult) -> &'static str {
    if result
        .validation_errors
        .iter()
        .any(|e| e.starts_with("Validation system error"))
    {
        "system_error"
    } else if result.is_valid {
        "valid"
    } else {
        "invalid"
    }
}

/// Record one scoring run
pub fn record_validation(result: &ValidationResult) {
    VALIDATIONS_TOTAL
        .with_label_values(&[validation_outcome(result)])
        .inc();
    COMPLIANCE_SCORE.observe(result.compliance_score);
}

/// Record a generation job reaching Completed or Failed
pub fn record_generation_job(status: SopStatus) {
    GENERATION_JOBS_TOTAL.with_label_values(&[status.as_str()]).inc();
}

// ============================================================================
// TESTS
// ============================================================================
