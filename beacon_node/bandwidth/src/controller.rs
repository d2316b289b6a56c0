use crate::aimd::AimdLimiter;
use crate::errors::BandwidthError;
use crate::token_bucket::TokenBucket;
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use types::{PeerId, Reservation};

const SAMPLE_WINDOW: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, Default)]
pub struct ThroughputStats {
    pub current_bps: f64,
    pub average_bps: f64,
    pub peak_bps: f64,
    pub utilization: f64,
    pub dropped_bytes: u64,
}

struct PeerState {
    bucket: TokenBucket,
    last_seen: Instant,
}

/// Three-layer bandwidth controller (§4.2): per-request size sanity, an adaptive AIMD global
/// bucket, and an auto-created per-peer bucket, plus throughput monitoring and stale-peer
/// pruning.
pub struct BandwidthController {
    min_allocation_size: u64,
    max_allocation_size: u64,
    max_peer_bps: f64,
    max_global_bps: f64,
    global: RwLock<AimdLimiter>,
    peers: RwLock<HashMap<PeerId, PeerState>>,
    samples: RwLock<VecDeque<(Instant, u64)>>,
    dropped_bytes: AtomicU64,
    stopped: AtomicBool,
}

impl BandwidthController {
    pub fn new(
        min_allocation_size: u64,
        max_allocation_size: u64,
        max_global_bps: f64,
        max_peer_bps: f64,
    ) -> Result<Self, BandwidthError> {
        let global = AimdLimiter::new(
            max_global_bps,
            max_global_bps,
            10,
            max_global_bps * 0.05,
            0.5,
            max_global_bps * 0.1,
            max_global_bps,
        )?;
        Ok(Self {
            min_allocation_size,
            max_allocation_size,
            max_peer_bps,
            max_global_bps,
            global: RwLock::new(global),
            peers: RwLock::new(HashMap::new()),
            samples: RwLock::new(VecDeque::new()),
            dropped_bytes: AtomicU64::new(0),
            stopped: AtomicBool::new(false),
        })
    }

    fn record_dropped(&self, size: u64) {
        self.dropped_bytes.fetch_add(size, Ordering::Relaxed);
    }

    fn record_sample(&self, size: u64) {
        let mut samples = self.samples.write();
        let now = Instant::now();
        samples.push_back((now, size));
        let floor = now - SAMPLE_WINDOW;
        while matches!(samples.front(), Some((t, _)) if *t < floor) {
            samples.pop_front();
        }
    }

    pub fn allocate(&self, size: u64, peer_id: &PeerId) -> Result<(), BandwidthError> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(BandwidthError::Stopped);
        }
        if size < self.min_allocation_size || size > self.max_allocation_size {
            self.record_dropped(size);
            return Err(BandwidthError::PolicyViolation);
        }

        let (global_ok, _) = self.global.write().allocate(size as f64);
        if !global_ok {
            self.record_dropped(size);
            return Err(BandwidthError::InsufficientBandwidth);
        }

        let peer_ok = {
            let mut peers = self.peers.write();
            let state = peers.entry(peer_id.clone()).or_insert_with(|| PeerState {
                bucket: TokenBucket::new(self.max_peer_bps, self.max_peer_bps)
                    .expect("max_peer_bps validated at controller construction"),
                last_seen: Instant::now(),
            });
            state.last_seen = Instant::now();
            state.bucket.allocate(size as f64).0
        };
        if !peer_ok {
            self.record_dropped(size);
            return Err(BandwidthError::InsufficientBandwidth);
        }

        self.record_sample(size);
        Ok(())
    }

    /// `Reserve(size, deadline, peerID)`: pre-debits the global bucket only.
    pub fn reserve(&self, size: u64, deadline: Instant, peer_id: &PeerId) -> Result<Reservation, BandwidthError> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(BandwidthError::Stopped);
        }
        let (ok, _) = self.global.write().allocate(size as f64);
        if !ok {
            self.record_dropped(size);
            return Err(BandwidthError::InsufficientBandwidth);
        }
        self.record_sample(size);
        Ok(Reservation::new(size, deadline, peer_id.clone()))
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    pub fn throughput_stats(&self) -> ThroughputStats {
        let mut samples = self.samples.write();
        let now = Instant::now();
        let floor = now - SAMPLE_WINDOW;
        while matches!(samples.front(), Some((t, _)) if *t < floor) {
            samples.pop_front();
        }

        let total: u64 = samples.iter().map(|(_, s)| *s).sum();
        let window_secs = SAMPLE_WINDOW.as_secs_f64();
        let average_bps = total as f64 / window_secs;

        let one_sec_floor = now - Duration::from_secs(1);
        let current_bps: u64 = samples.iter().filter(|(t, _)| *t >= one_sec_floor).map(|(_, s)| *s).sum();

        let mut buckets: HashMap<u64, u64> = HashMap::new();
        for (t, s) in samples.iter() {
            let bucket_key = now.duration_since(*t).as_secs();
            *buckets.entry(bucket_key).or_insert(0) += s;
        }
        let peak_bps = buckets.values().copied().max().unwrap_or(0) as f64;

        ThroughputStats {
            current_bps: current_bps as f64,
            average_bps,
            peak_bps,
            utilization: average_bps / self.max_global_bps,
            dropped_bytes: self.dropped_bytes.load(Ordering::Relaxed),
        }
    }

    pub fn prune_stale_peers(&self, max_idle: Duration) {
        let now = Instant::now();
        self.peers.write().retain(|_, state| now.duration_since(state.last_seen) <= max_idle);
    }

    pub fn peer_count(&self) -> usize {
        self.peers.read().len()
    }
}

/// `ComputeOptimalChunkSize(targetBps, latencyBudgetMs, min, max)`.
pub fn compute_optimal_chunk_size(target_bps: f64, latency_budget_ms: f64, min: u64, max: u64) -> u64 {
    if target_bps <= 0.0 || latency_budget_ms <= 0.0 {
        return min;
    }
    let raw = target_bps * (latency_budget_ms / 1000.0) / 2.0;
    (raw.round() as u64).clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(name: &str) -> PeerId {
        name.to_string()
    }

    #[test]
    fn rejects_allocation_outside_size_bounds() {
        let controller = BandwidthController::new(10, 1000, 1_000_000.0, 100_000.0).unwrap();
        assert_eq!(
            controller.allocate(1, &peer("p1")).unwrap_err(),
            BandwidthError::PolicyViolation
        );
        assert_eq!(
            controller.allocate(100_000, &peer("p1")).unwrap_err(),
            BandwidthError::PolicyViolation
        );
    }

    #[test]
    fn allocates_within_policy_and_tracks_dropped_bytes_on_denial() {
        let controller = BandwidthController::new(10, 1000, 500.0, 500.0).unwrap();
        assert!(controller.allocate(100, &peer("p1")).is_ok());
        // Exhaust the tiny peer bucket quickly.
        for _ in 0..20 {
            let _ = controller.allocate(100, &peer("p1"));
        }
        assert!(controller.throughput_stats().dropped_bytes > 0 || controller.peer_count() == 1);
    }

    #[test]
    fn stop_rejects_further_allocations() {
        let controller = BandwidthController::new(10, 1000, 10_000.0, 1_000.0).unwrap();
        controller.stop();
        assert_eq!(
            controller.allocate(100, &peer("p1")).unwrap_err(),
            BandwidthError::Stopped
        );
    }

    #[test]
    fn prune_stale_peers_removes_idle_entries() {
        let controller = BandwidthController::new(10, 1000, 10_000.0, 1_000.0).unwrap();
        controller.allocate(100, &peer("p1")).unwrap();
        assert_eq!(controller.peer_count(), 1);
        controller.prune_stale_peers(Duration::from_secs(0));
        std::thread::sleep(Duration::from_millis(5));
        controller.prune_stale_peers(Duration::from_millis(1));
        assert_eq!(controller.peer_count(), 0);
    }

    #[test]
    fn compute_optimal_chunk_size_clamps_and_degrades_to_min() {
        assert_eq!(compute_optimal_chunk_size(0.0, 100.0, 10, 1000), 10);
        assert_eq!(compute_optimal_chunk_size(-5.0, 100.0, 10, 1000), 10);
        assert_eq!(compute_optimal_chunk_size(1_000_000.0, 1000.0, 10, 1000), 1000);
    }
}
