//! Metrics definitions for the drink service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `drinks_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `method`: standard HTTP verbs, everything else is `OTHER`
//! - `endpoint`: the fixed route table, everything else is `/other`
//! - `permission`: the route permission strings
//! - `outcome` / `error_code`: `AuthError::code()` values plus `granted`
//! - `status`: success, error, timeout
//! - `operation`: bounded by repository code

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the Prometheus recorder and return the handle used to render
/// `/metrics`.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("drinks_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("drinks_jwks_fetch".to_string()),
            &[
                0.010, 0.025, 0.050, 0.100, 0.200, 0.500, 1.000, 2.000, 5.000, 10.000,
            ],
        )
        .map_err(|e| format!("Failed to set JWKS fetch buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("drinks_db_query".to_string()),
            &[
                0.001, 0.002, 0.005, 0.010, 0.020, 0.050, 0.100, 0.250, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set DB query buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion.
///
/// Metric: `drinks_http_requests_total`, `drinks_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status` / `status_code`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let method = normalize_method(method);
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("drinks_http_request_duration_seconds",
        "method" => method,
        "endpoint" => normalized_endpoint,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("drinks_http_requests_total",
        "method" => method,
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

fn normalize_method(method: &str) -> &'static str {
    match method {
        "GET" => "GET",
        "HEAD" => "HEAD",
        "POST" => "POST",
        "PUT" => "PUT",
        "PATCH" => "PATCH",
        "DELETE" => "DELETE",
        "OPTIONS" => "OPTIONS",
        "CONNECT" => "CONNECT",
        "TRACE" => "TRACE",
        _ => "OTHER",
    }
}

fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Map a request path onto the fixed route table.
fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/" => "/",
        "/health" => "/health",
        "/metrics" => "/metrics",
        "/drinks" => "/drinks",
        "/drinks-detail" => "/drinks-detail",
        _ => normalize_dynamic_endpoint(path),
    }
}

fn normalize_dynamic_endpoint(path: &str) -> &'static str {
    // /drinks/{id}
    if let Some(rest) = path.strip_prefix("/drinks/") {
        if !rest.is_empty() && !rest.contains('/') {
            return "/drinks/{id}";
        }
    }

    "/other"
}

// ============================================================================
// Authorization Metrics
// ============================================================================

/// Record the outcome of one authorization decision.
///
/// Metric: `drinks_auth_decisions_total`
/// Labels: `permission`, `outcome` (`granted` or an auth error code)
pub fn record_auth_decision(permission: &str, outcome: &'static str) {
    counter!("drinks_auth_decisions_total",
        "permission" => permission.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a token verification failure before it is collapsed for the caller.
///
/// Metric: `drinks_token_verification_failures_total`
/// Labels: `error_code`
pub fn record_token_verification_failure(error_code: &'static str) {
    counter!("drinks_token_verification_failures_total",
        "error_code" => error_code
    )
    .increment(1);
}

/// Record a JWKS fetch.
///
/// Metric: `drinks_jwks_fetches_total`, `drinks_jwks_fetch_duration_seconds`
/// Labels: `status` (success, error, timeout)
pub fn record_jwks_fetch(status: &'static str, duration: Duration) {
    histogram!("drinks_jwks_fetch_duration_seconds",
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("drinks_jwks_fetches_total",
        "status" => status
    )
    .increment(1);
}

// ============================================================================
// Database Metrics
// ============================================================================

/// Record a repository query.
///
/// Metric: `drinks_db_query_duration_seconds`, `drinks_db_queries_total`
/// Labels: `operation`, `status`
pub fn record_db_query(operation: &'static str, status: &'static str, duration: Duration) {
    histogram!("drinks_db_query_duration_seconds",
        "operation" => operation,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("drinks_db_queries_total",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
}
