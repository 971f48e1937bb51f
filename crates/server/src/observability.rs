use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramTimer, HistogramVec, IntCounterVec,
    TextEncoder,
};
use service::ServiceError;

// Prometheus metrics (default registry)
pub static OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "entity_service_operations_total",
        "Operations handled, by entity space, operation and outcome",
        &["space", "op", "outcome"]
    )
    .expect("register operations_total")
});

pub static LIFECYCLE_TRANSITIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "entity_service_lifecycle_transitions_total",
        "Lifecycle control calls, by entity space and requested transition",
        &["space", "transition"]
    )
    .expect("register lifecycle_transitions_total")
});

pub static OPERATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "entity_service_operation_duration_seconds",
        "Operation duration in seconds",
        &["space", "op"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("register operation_duration")
});

pub fn start_timer(space: &str, op: &str) -> HistogramTimer {
    OPERATION_DURATION.with_label_values(&[space, op]).start_timer()
}

/// Count one finished operation; the outcome label is `ok` or the error kind.
pub fn record<T>(space: &str, op: &str, res: &Result<T, ServiceError>) {
    let outcome = match res {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    OPERATIONS_TOTAL.with_label_values(&[space, op, outcome]).inc();
}

pub fn record_transition(space: &str, transition: &str) {
    LIFECYCLE_TRANSITIONS_TOTAL.with_label_values(&[space, transition]).inc();
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
