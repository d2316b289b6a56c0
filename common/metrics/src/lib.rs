//! Thin wrapper over `prometheus`, mirroring the surface the rest of this workspace expects:
//! fallible `try_create_*` constructors backed by a single process-wide registry, plus
//! `inc_counter`/`observe`/`start_timer_vec` helpers that silently no-op on a construction
//! failure rather than panicking call sites.

use std::sync::LazyLock;

pub use prometheus::{Histogram, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec};
use prometheus::{Encoder, Registry, TextEncoder};

pub type Result<T> = std::result::Result<T, prometheus::Error>;

static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

pub fn try_create_int_counter(name: &str, help: &str) -> Result<IntCounter> {
    let counter = IntCounter::new(name, help)?;
    REGISTRY.register(Box::new(counter.clone()))?;
    Ok(counter)
}

pub fn try_create_int_counter_vec(
    name: &str,
    help: &str,
    label_names: &[&str],
) -> Result<IntCounterVec> {
    let opts = prometheus::Opts::new(name, help);
    let counter_vec = IntCounterVec::new(opts, label_names)?;
    REGISTRY.register(Box::new(counter_vec.clone()))?;
    Ok(counter_vec)
}

pub fn try_create_int_gauge(name: &str, help: &str) -> Result<IntGauge> {
    let gauge = IntGauge::new(name, help)?;
    REGISTRY.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

pub fn try_create_int_gauge_vec(
    name: &str,
    help: &str,
    label_names: &[&str],
) -> Result<IntGaugeVec> {
    let opts = prometheus::Opts::new(name, help);
    let gauge_vec = IntGaugeVec::new(opts, label_names)?;
    REGISTRY.register(Box::new(gauge_vec.clone()))?;
    Ok(gauge_vec)
}

pub fn try_create_histogram(name: &str, help: &str) -> Result<Histogram> {
    let opts = prometheus::HistogramOpts::new(name, help);
    let histogram = Histogram::with_opts(opts)?;
    REGISTRY.register(Box::new(histogram.clone()))?;
    Ok(histogram)
}

pub fn try_create_histogram_vec(
    name: &str,
    help: &str,
    label_names: &[&str],
) -> Result<HistogramVec> {
    let opts = prometheus::HistogramOpts::new(name, help);
    let histogram_vec = HistogramVec::new(opts, label_names)?;
    REGISTRY.register(Box::new(histogram_vec.clone()))?;
    Ok(histogram_vec)
}

pub fn inc_counter(counter: &Result<IntCounter>) {
    if let Ok(c) = counter {
        c.inc();
    }
}

pub fn inc_counter_by(counter: &Result<IntCounter>, amount: u64) {
    if let Ok(c) = counter {
        c.inc_by(amount);
    }
}

pub fn inc_counter_vec(counter_vec: &Result<IntCounterVec>, label_values: &[&str]) {
    if let Ok(cv) = counter_vec {
        cv.with_label_values(label_values).inc();
    }
}

pub fn set_gauge(gauge: &Result<IntGauge>, value: i64) {
    if let Ok(g) = gauge {
        g.set(value);
    }
}

pub fn set_gauge_vec(gauge_vec: &Result<IntGaugeVec>, label_values: &[&str], value: i64) {
    if let Ok(gv) = gauge_vec {
        gv.with_label_values(label_values).set(value);
    }
}

pub fn observe(histogram: &Result<Histogram>, value: f64) {
    if let Ok(h) = histogram {
        h.observe(value);
    }
}

pub fn observe_vec(histogram_vec: &Result<HistogramVec>, label_values: &[&str], value: f64) {
    if let Ok(hv) = histogram_vec {
        hv.with_label_values(label_values).observe(value);
    }
}

/// Starts a timer against a `HistogramVec` entry; the returned guard records the elapsed
/// duration into the histogram when dropped. Returns `None` if the vec failed to construct.
pub fn start_timer_vec(
    histogram_vec: &Result<HistogramVec>,
    label_values: &[&str],
) -> Option<prometheus::HistogramTimer> {
    histogram_vec
        .as_ref()
        .ok()
        .map(|hv| hv.with_label_values(label_values).start_timer())
}

pub fn start_timer(histogram: &Result<Histogram>) -> Option<prometheus::HistogramTimer> {
    histogram.as_ref().ok().map(|h| h.start_timer())
}

/// Renders the current registry in Prometheus text exposition format.
pub fn encode_text() -> Result<String> {
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_roundtrips_through_text_encoding() {
        let counter = try_create_int_counter("test_metrics_counter_total", "a test counter").unwrap();
        inc_counter(&Ok(counter.clone()));
        inc_counter_by(&Ok(counter.clone()), 4);
        assert_eq!(counter.get(), 5);
        let text = encode_text().unwrap();
        assert!(text.contains("test_metrics_counter_total"));
    }

    #[test]
    fn failed_construction_no_ops_instead_of_panicking() {
        let err: Result<IntCounter> = Err(prometheus::Error::Msg("boom".to_string()));
        inc_counter(&err);
        observe(&Err(prometheus::Error::Msg("boom".to_string())), 1.0);
    }
}
