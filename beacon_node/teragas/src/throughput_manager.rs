use crate::errors::TeragasError;
use crate::metrics;
use parking_lot::RwLock;
use std::collections::VecDeque;
use types::Slot;

/// Sliding-window AIMD adjustment of `blobs-per-block` (§4.13). A window of
/// `EpochsPerAdjustment * SlotsPerEpoch` `(slot, clampedBlobCount)` records accumulates until
/// full, at which point `adjust_limit` scales the current limit up or down by a fixed step.
pub struct ThroughputManager {
    base: u64,
    min: u64,
    max: u64,
    step: u64,
    scale_up_threshold: f64,
    scale_down_threshold: f64,
    window_size: usize,
    inner: RwLock<Inner>,
}

struct Inner {
    limit: u64,
    last_slot: Option<Slot>,
    records: VecDeque<u64>,
    scale_up_count: u64,
    scale_down_count: u64,
}

impl ThroughputManager {
    pub fn new(
        base: u64,
        min: u64,
        max: u64,
        step: u64,
        scale_up_threshold: f64,
        scale_down_threshold: f64,
        epochs_per_adjustment: u64,
        slots_per_epoch: u64,
    ) -> Self {
        let window_size = (epochs_per_adjustment * slots_per_epoch).max(1) as usize;
        Self {
            base,
            min,
            max,
            step,
            scale_up_threshold,
            scale_down_threshold,
            window_size,
            inner: RwLock::new(Inner {
                limit: base,
                last_slot: None,
                records: VecDeque::with_capacity(window_size),
                scale_up_count: 0,
                scale_down_count: 0,
            }),
        }
    }

    pub fn current_limit(&self) -> u64 {
        self.inner.read().limit
    }

    pub fn scale_up_count(&self) -> u64 {
        self.inner.read().scale_up_count
    }

    pub fn scale_down_count(&self) -> u64 {
        self.inner.read().scale_down_count
    }

    /// Records one slot's realized blob count, clamped to the current limit for the
    /// utilization ratio. Rejects non-strictly-increasing slot numbers.
    pub fn record_utilization(&self, blobs: u64, slot: Slot) -> Result<(), TeragasError> {
        let mut inner = self.inner.write();
        if let Some(last) = inner.last_slot {
            if slot <= last {
                return Err(TeragasError::StrictMonotonicityViolation);
            }
        }
        inner.last_slot = Some(slot);
        let limit = inner.limit;
        inner.records.push_back(blobs.min(limit));
        Ok(())
    }

    fn utilization_rate(inner: &Inner) -> f64 {
        if inner.records.is_empty() || inner.limit == 0 {
            return 0.0;
        }
        let sum: u64 = inner.records.iter().sum();
        sum as f64 / (inner.records.len() as u64 * inner.limit) as f64
    }

    /// Scales the limit when the window is full; clears history regardless of outcome.
    /// Returns whether the limit changed.
    pub fn adjust_limit(&self) -> bool {
        let mut inner = self.inner.write();
        if inner.records.len() < self.window_size {
            return false;
        }
        let rate = Self::utilization_rate(&inner);
        let mut changed = false;
        if rate >= self.scale_up_threshold {
            let new_limit = (inner.limit + self.step).min(self.max);
            if new_limit != inner.limit {
                inner.limit = new_limit;
                inner.scale_up_count += 1;
                changed = true;
            }
        } else if rate <= self.scale_down_threshold {
            let new_limit = inner.limit.saturating_sub(self.step).max(self.min);
            if new_limit != inner.limit {
                inner.limit = new_limit;
                inner.scale_down_count += 1;
                changed = true;
            }
        }
        inner.records.clear();
        metrics::set_gauge(&metrics::THROUGHPUT_CURRENT_LIMIT, inner.limit as i64);
        changed
    }

    pub fn reset(&self) {
        let mut inner = self.inner.write();
        inner.limit = self.base;
        inner.last_slot = None;
        inner.records.clear();
    }
}
