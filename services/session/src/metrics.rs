//! Prometheus metrics for the session service.
//!
//! Store failures are counted apart from token rejections so infrastructure
//! trouble is visible without reading logs.

use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

/// Tokens issued counter.
pub static TOKENS_ISSUED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_service_tokens_issued_total",
        "Total number of session tokens issued",
        &["account_type"]
    )
    .expect("Failed to register tokens_issued metric")
});

/// Token refresh outcomes.
pub static TOKENS_REFRESHED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_service_tokens_refreshed_total",
        "Total number of token refresh attempts",
        &["status"]
    )
    .expect("Failed to register tokens_refreshed metric")
});

/// Token revocation outcomes.
pub static TOKENS_REVOKED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_service_tokens_revoked_total",
        "Total number of token revocation attempts",
        &["status"]
    )
    .expect("Failed to register tokens_revoked metric")
});

/// Token validation outcomes.
pub static VALIDATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_service_validations_total",
        "Total number of token validations",
        &["outcome"]
    )
    .expect("Failed to register validations metric")
});

/// Session store failures.
pub static STORE_ERRORS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_service_store_errors_total",
        "Total number of session store failures",
        &["operation"]
    )
    .expect("Failed to register store_errors metric")
});

/// gRPC method latency histogram.
pub static GRPC_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "session_service_grpc_latency_seconds",
        "gRPC method latency in seconds",
        &["method"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to register grpc_latency metric")
});

/// Record a token issuance.
pub fn record_token_issued(account_type: &str) {
    TOKENS_ISSUED.with_label_values(&[account_type]).inc();
}

/// Record a refresh outcome ("ok" or an error kind).
pub fn record_token_refreshed(status: &str) {
    TOKENS_REFRESHED.with_label_values(&[status]).inc();
}

/// Record a revocation outcome ("ok" or an error kind).
pub fn record_token_revoked(status: &str) {
    TOKENS_REVOKED.with_label_values(&[status]).inc();
}

/// Record a validation outcome ("ok" or an error kind).
pub fn record_validation(outcome: &str) {
    VALIDATIONS.with_label_values(&[outcome]).inc();
}

/// Record a failed store operation.
pub fn record_store_error(operation: &str) {
    STORE_ERRORS.with_label_values(&[operation]).inc();
}

/// Record gRPC method latency.
pub fn record_grpc_latency(method: &str, duration_secs: f64) {
    GRPC_LATENCY.with_label_values(&[method]).observe(duration_secs);
}
