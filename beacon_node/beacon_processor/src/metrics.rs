use metrics::*;
use std::sync::LazyLock;

pub static PROOF_VALIDATIONS_SUBMITTED_TOTAL: LazyLock<Result<IntCounterVec>> = LazyLock::new(|| {
    try_create_int_counter_vec(
        "beacon_processor_proof_validations_submitted_total",
        "Count of proof validation items submitted, by priority",
        &["priority"],
    )
});

pub static PROOF_VALIDATIONS_SUCCEEDED_TOTAL: LazyLock<Result<IntCounterVec>> = LazyLock::new(|| {
    try_create_int_counter_vec(
        "beacon_processor_proof_validations_succeeded_total",
        "Count of proof validations that matched the expected root, by priority",
        &["priority"],
    )
});

pub static PROOF_VALIDATIONS_FAILED_TOTAL: LazyLock<Result<IntCounterVec>> = LazyLock::new(|| {
    try_create_int_counter_vec(
        "beacon_processor_proof_validations_failed_total",
        "Count of proof validations that did not match the expected root, by priority",
        &["priority"],
    )
});

pub static PROOF_VALIDATIONS_TIMEOUT_TOTAL: LazyLock<Result<IntCounterVec>> = LazyLock::new(|| {
    try_create_int_counter_vec(
        "beacon_processor_proof_validations_timeout_total",
        "Count of proof validations that exceeded their deadline, by priority",
        &["priority"],
    )
});

pub static QUEUE_DEPTH: LazyLock<Result<IntGaugeVec>> = LazyLock::new(|| {
    try_create_int_gauge_vec(
        "beacon_processor_queue_depth",
        "Number of items currently queued, by priority",
        &["priority"],
    )
});

pub static PROOF_VALIDATION_LATENCY: LazyLock<Result<HistogramVec>> = LazyLock::new(|| {
    try_create_histogram_vec(
        "beacon_processor_proof_validation_latency_seconds",
        "Time spent validating a single proof end-to-end, by priority",
        &["priority"],
    )
});
