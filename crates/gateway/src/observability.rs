use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram, IntCounter, IntCounterVec,
    TextEncoder,
};

// Prometheus metrics (default registry)
pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "gateway_requests_total",
        "Total requests handled by the gateway",
        &["method", "status"]
    )
    .expect("register requests_total")
});

pub static AUTH_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "gateway_auth_failures_total",
        "Requests rejected for a missing or invalid bearer token"
    )
    .expect("register auth_failures_total")
});

pub static DOWNSTREAM_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "gateway_downstream_errors_total",
        "Downstream calls that failed in transport or returned an error status",
        &["resource"]
    )
    .expect("register downstream_errors_total")
});

pub static TOKENS_REISSUED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "gateway_tokens_reissued_total",
        "Bearer tokens minted for downstream calls"
    )
    .expect("register tokens_reissued_total")
});

pub static REQUEST_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "gateway_request_duration_seconds",
        "Request duration in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("register request_duration")
});

/// Middleware recording request count, duration and auth failures.
pub async fn track(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let timer = REQUEST_DURATION.start_timer();
    let resp = next.run(req).await;
    timer.observe_duration();
    let status = resp.status();
    REQUESTS_TOTAL.with_label_values(&[method.as_str(), status.as_str()]).inc();
    if status == StatusCode::UNAUTHORIZED {
        AUTH_FAILURES_TOTAL.inc();
    }
    resp
}

pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}

pub async fn metrics() -> (StatusCode, String) {
    encode_metrics()
}
