use metrics::*;
use std::sync::LazyLock;

pub static RECONSTRUCT_ATTEMPTS_TOTAL: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter(
        "reconstruction_attempts_total",
        "Number of blob reconstruction attempts",
    )
});

pub static RECONSTRUCT_SUCCESSES_TOTAL: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter(
        "reconstruction_successes_total",
        "Number of successful blob reconstructions",
    )
});

pub static RECONSTRUCT_FAILURES_TOTAL: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter(
        "reconstruction_failures_total",
        "Number of failed blob reconstruction attempts",
    )
});

pub static RECONSTRUCT_LATENCY_MS_TOTAL: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter(
        "reconstruction_latency_ms_total",
        "Accumulated wall-clock milliseconds spent reconstructing blobs",
    )
});

pub static CELLS_COLLECTED_TOTAL: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter(
        "reconstruction_cells_collected_total",
        "Number of individual cells accepted by the collector",
    )
});
