use metrics::*;
use std::sync::LazyLock;

// Streaming pipeline (C12)
pub static STREAM_RECEIVED_TOTAL: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("teragas_stream_received_total", "items received"));
pub static STREAM_VALIDATED_TOTAL: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("teragas_stream_validated_total", "items validated"));
pub static STREAM_DECODED_TOTAL: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("teragas_stream_decoded_total", "items decoded"));
pub static STREAM_STORED_TOTAL: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("teragas_stream_stored_total", "items stored"));
pub static STREAM_DROPPED_TOTAL: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("teragas_stream_dropped_total", "items dropped after exhausting retries"));
pub static STREAM_BYTES_PROCESSED_TOTAL: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("teragas_stream_bytes_processed_total", "raw bytes processed"));

// Teragas pipeline (C13)
pub static TP_BYTES_IN_TOTAL: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("teragas_tp_bytes_in_total", "bytes entering the teragas pipeline"));
pub static TP_BYTES_OUT_TOTAL: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("teragas_tp_bytes_out_total", "bytes emitted by the teragas pipeline"));
pub static TP_PACKETS_IN_TOTAL: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("teragas_tp_packets_in_total", "packets entering the teragas pipeline"));
pub static TP_PACKETS_OUT_TOTAL: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("teragas_tp_packets_out_total", "packets emitted by the teragas pipeline"));
pub static TP_DROPPED_TOTAL: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("teragas_tp_dropped_total", "packets dropped by a stage error"));
pub static TP_BANDWIDTH_EVENTS_TOTAL: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("teragas_tp_bandwidth_events_total", "bandwidth gate denials"));
pub static TP_COMPRESSION_BYTES_SAVED_TOTAL: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter("teragas_tp_compression_bytes_saved_total", "bytes saved by compression")
});
pub static TP_STAGE_ERRORS_TOTAL: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("teragas_tp_stage_errors_total", "stage errors"));
pub static TP_LATENCY_MS_SUM: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("teragas_tp_latency_ms_sum", "sum of per-packet pipeline latency in ms"));
pub static TP_LATENCY_COUNT: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("teragas_tp_latency_count", "count of packets timed"));

// Throughput manager (C14)
pub static THROUGHPUT_CURRENT_LIMIT: LazyLock<Result<IntGauge>> =
    LazyLock::new(|| try_create_int_gauge("teragas_throughput_current_limit", "current blobs-per-block limit"));

// Teradata manager (C13)
pub static TERADATA_TOTAL_BYTES: LazyLock<Result<IntGauge>> =
    LazyLock::new(|| try_create_int_gauge("teragas_teradata_total_bytes", "total bytes held by the teradata store"));
pub static TERADATA_ENTRIES: LazyLock<Result<IntGauge>> =
    LazyLock::new(|| try_create_int_gauge("teragas_teradata_entries", "entries held by the teradata store"));
