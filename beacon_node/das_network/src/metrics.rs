use metrics::*;
use std::sync::LazyLock;

pub static SAMPLING_ROUNDS_TOTAL: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("das_network_sampling_rounds_total", "Sampling rounds performed"));

pub static SAMPLES_SUCCEEDED_TOTAL: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter("das_network_samples_succeeded_total", "Individual column samples that succeeded")
});

pub static SAMPLES_FAILED_TOTAL: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter("das_network_samples_failed_total", "Individual column samples that failed")
});

pub static AVAILABILITY_CONFIRMED_TOTAL: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter("das_network_availability_confirmed_total", "Rounds that confirmed availability")
});

pub static AVAILABILITY_DENIED_TOTAL: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter("das_network_availability_denied_total", "Rounds that denied availability")
});

pub static CELLS_RECEIVED_TOTAL: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("das_network_cells_received_total", "Gossip cells accepted"));

pub static CELLS_DUPLICATE_TOTAL: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter("das_network_cells_duplicate_total", "Gossip cells ignored as duplicates")
});

pub static CELLS_DROPPED_TOTAL: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter("das_network_cells_dropped_total", "Gossip cells dropped (reconstructed or rejected)")
});
