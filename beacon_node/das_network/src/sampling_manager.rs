use crate::errors::NetworkError;
use crate::metrics;
use das_crypto::{hash_chain_sample, network_sampling_seed};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use types::{ColumnIndex, DasSpec, NodeId, Slot};

/// Fetches a sampled column from a specific peer. Implemented by the network transport; kept
/// abstract here so this crate stays transport-agnostic.
pub trait SampleProvider: Send + Sync {
    fn sample(&self, peer: &NodeId, column: ColumnIndex) -> Result<(Vec<u8>, Duration), NetworkError>;
}

/// Fallback source when no custodying peer is available.
pub trait LocalColumnStore: Send + Sync {
    fn get_local(&self, column: ColumnIndex) -> Option<Vec<u8>>;
}

#[derive(Debug, Clone, Copy)]
struct PeerScoreEntry {
    score: f64,
    queries: u64,
    successes: u64,
    failures: u64,
    total_latency_ms: u64,
}

impl PeerScoreEntry {
    fn initial(initial_score: f64) -> Self {
        Self {
            score: initial_score,
            queries: 0,
            successes: 0,
            failures: 0,
            total_latency_ms: 0,
        }
    }

    fn success_rate(&self) -> Option<f64> {
        (self.queries > 0).then(|| self.successes as f64 / self.queries as f64)
    }

    fn avg_latency_ms(&self) -> Option<f64> {
        (self.successes > 0).then(|| self.total_latency_ms as f64 / self.successes as f64)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PeerScoreSnapshot {
    pub score: f64,
    pub success_rate: Option<f64>,
    pub avg_latency_ms: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingRoundResult {
    pub slot: u64,
    pub attempted: usize,
    pub successes: usize,
    pub failures: usize,
    pub available: bool,
}

/// Finds the custodying peers for a column, as provided by e.g. `custody::PeerDirectory`.
pub trait CustodyDirectory {
    fn find_peers_for_column(&self, column: ColumnIndex) -> Option<Vec<NodeId>>;
}

impl CustodyDirectory for custody::PeerDirectory {
    fn find_peers_for_column(&self, column: ColumnIndex) -> Option<Vec<NodeId>> {
        self.find_peers_for_column(column).ok()
    }
}

/// Network-level sampling orchestration (§4.9): chooses columns from a fixed domain-separated
/// seed, queries the best-scored custodying peer per column (falling back to a local store),
/// and aggregates a round's availability verdict.
pub struct SamplingNetworkManager {
    spec: DasSpec,
    started: AtomicBool,
    peer_scores: RwLock<HashMap<NodeId, PeerScoreEntry>>,
    initial_peer_score: f64,
    min_peer_score: f64,
    max_peer_score: f64,
    availability_threshold: f64,
}

impl SamplingNetworkManager {
    pub fn new(
        spec: DasSpec,
        initial_peer_score: f64,
        min_peer_score: f64,
        max_peer_score: f64,
        availability_threshold: f64,
    ) -> Self {
        Self {
            spec,
            started: AtomicBool::new(false),
            peer_scores: RwLock::new(HashMap::new()),
            initial_peer_score,
            min_peer_score,
            max_peer_score,
            availability_threshold,
        }
    }

    pub fn start(&self) {
        self.started.store(true, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.started.store(false, Ordering::SeqCst);
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    fn pick_best_peer(&self, peers: &[NodeId]) -> Option<NodeId> {
        let scores = self.peer_scores.read();
        peers
            .iter()
            .max_by(|a, b| {
                let sa = scores.get(a).map(|e| e.score).unwrap_or(self.initial_peer_score);
                let sb = scores.get(b).map(|e| e.score).unwrap_or(self.initial_peer_score);
                sa.partial_cmp(&sb).unwrap_or(std::cmp::Ordering::Equal)
            })
            .copied()
    }

    fn record_query(&self, peer: &NodeId, success: bool, latency_ms: u64) {
        let mut scores = self.peer_scores.write();
        let entry = scores
            .entry(*peer)
            .or_insert_with(|| PeerScoreEntry::initial(self.initial_peer_score));
        entry.queries += 1;
        if success {
            entry.successes += 1;
            entry.total_latency_ms += latency_ms;
            entry.score = (entry.score + 1.0).min(self.max_peer_score);
        } else {
            entry.failures += 1;
            entry.score = (entry.score - 5.0).max(self.min_peer_score);
        }
    }

    pub fn peer_score(&self, peer: &NodeId) -> Option<PeerScoreSnapshot> {
        self.peer_scores.read().get(peer).map(|e| PeerScoreSnapshot {
            score: e.score,
            success_rate: e.success_rate(),
            avg_latency_ms: e.avg_latency_ms(),
        })
    }

    /// Performs one sampling round for `slot`, drawing `count` columns from the fixed
    /// domain-separated seed and resolving each through a custodying peer or the local store.
    pub fn perform_sampling(
        &self,
        slot: Slot,
        count: usize,
        custody: Option<&dyn CustodyDirectory>,
        provider: &dyn SampleProvider,
        local_store: Option<&dyn LocalColumnStore>,
    ) -> Result<SamplingRoundResult, NetworkError> {
        if !self.is_started() {
            return Err(NetworkError::NotStarted);
        }
        metrics::inc_counter(&metrics::SAMPLING_ROUNDS_TOTAL);

        let seed = network_sampling_seed(slot.as_u64());
        let columns = hash_chain_sample(&seed, self.spec.number_of_columns, count);

        let mut successes = 0usize;
        let mut failures = 0usize;

        for column in &columns {
            let mut resolved = false;
            if let Some(dir) = custody {
                if let Some(peers) = dir.find_peers_for_column(*column) {
                    if !peers.is_empty() {
                        if let Some(peer) = self.pick_best_peer(&peers) {
                            resolved = true;
                            match provider.sample(&peer, *column) {
                                Ok((_, latency)) => {
                                    self.record_query(&peer, true, latency.as_millis() as u64);
                                    successes += 1;
                                    metrics::inc_counter(&metrics::SAMPLES_SUCCEEDED_TOTAL);
                                }
                                Err(_) => {
                                    self.record_query(&peer, false, 0);
                                    failures += 1;
                                    metrics::inc_counter(&metrics::SAMPLES_FAILED_TOTAL);
                                }
                            }
                        }
                    }
                }
            }
            if !resolved {
                if let Some(store) = local_store {
                    if store.get_local(*column).is_some() {
                        successes += 1;
                        metrics::inc_counter(&metrics::SAMPLES_SUCCEEDED_TOTAL);
                        continue;
                    }
                }
                failures += 1;
                metrics::inc_counter(&metrics::SAMPLES_FAILED_TOTAL);
            }
        }

        let attempted = columns.len();
        let available =
            attempted > 0 && successes as f64 / attempted as f64 >= self.availability_threshold;
        if available {
            metrics::inc_counter(&metrics::AVAILABILITY_CONFIRMED_TOTAL);
        } else {
            metrics::inc_counter(&metrics::AVAILABILITY_DENIED_TOTAL);
        }

        Ok(SamplingRoundResult {
            slot: slot.as_u64(),
            attempted,
            successes,
            failures,
            available,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct AlwaysOk;
    impl SampleProvider for AlwaysOk {
        fn sample(&self, _peer: &NodeId, _column: ColumnIndex) -> Result<(Vec<u8>, Duration), NetworkError> {
            Ok((vec![1, 2, 3], Duration::from_millis(5)))
        }
    }

    struct AlwaysFail;
    impl SampleProvider for AlwaysFail {
        fn sample(&self, _peer: &NodeId, _column: ColumnIndex) -> Result<(Vec<u8>, Duration), NetworkError> {
            Err(NetworkError::NoProviderAvailable(0))
        }
    }

    struct FixedCustody(NodeId);
    impl CustodyDirectory for FixedCustody {
        fn find_peers_for_column(&self, _column: ColumnIndex) -> Option<Vec<NodeId>> {
            Some(vec![self.0])
        }
    }

    struct NoLocalStore;
    impl LocalColumnStore for NoLocalStore {
        fn get_local(&self, _column: ColumnIndex) -> Option<Vec<u8>> {
            None
        }
    }

    fn node() -> NodeId {
        NodeId::new([7u8; 32])
    }

    #[test]
    fn rejects_sampling_before_start() {
        let manager = SamplingNetworkManager::new(DasSpec::minimal(), 0.0, -100.0, 100.0, 0.5);
        let err = manager
            .perform_sampling(Slot::new(1), 4, None, &AlwaysOk, Some(&NoLocalStore))
            .unwrap_err();
        assert_eq!(err, NetworkError::NotStarted);
    }

    #[test]
    fn successful_round_raises_peer_score_and_confirms_availability() {
        let manager = SamplingNetworkManager::new(DasSpec::minimal(), 0.0, -100.0, 100.0, 0.5);
        manager.start();
        let custody = FixedCustody(node());
        let result = manager
            .perform_sampling(Slot::new(1), 4, Some(&custody), &AlwaysOk, Some(&NoLocalStore))
            .unwrap();
        assert!(result.available);
        assert_eq!(result.successes, result.attempted);
        let snapshot = manager.peer_score(&node()).unwrap();
        assert!(snapshot.score > 0.0);
        assert_eq!(snapshot.success_rate, Some(1.0));
    }

    #[test]
    fn failing_round_lowers_peer_score_and_denies_availability() {
        let manager = SamplingNetworkManager::new(DasSpec::minimal(), 0.0, -100.0, 100.0, 0.5);
        manager.start();
        let custody = FixedCustody(node());
        let result = manager
            .perform_sampling(Slot::new(1), 4, Some(&custody), &AlwaysFail, Some(&NoLocalStore))
            .unwrap();
        assert!(!result.available);
        assert_eq!(result.failures, result.attempted);
        let snapshot = manager.peer_score(&node()).unwrap();
        assert!(snapshot.score < 0.0);
    }

    #[test]
    fn peer_score_is_deterministic_for_the_same_slot_and_seed() {
        let manager = SamplingNetworkManager::new(DasSpec::minimal(), 0.0, -100.0, 100.0, 0.5);
        manager.start();
        let custody = FixedCustody(node());
        let _ = manager.perform_sampling(Slot::new(9), 4, Some(&custody), &AlwaysOk, Some(&NoLocalStore));
        let calls = Mutex::new(0);
        struct Counting<'a>(&'a Mutex<u32>);
        impl SampleProvider for Counting<'_> {
            fn sample(&self, _peer: &NodeId, _column: ColumnIndex) -> Result<(Vec<u8>, Duration), NetworkError> {
                *self.0.lock().unwrap() += 1;
                Ok((vec![], Duration::from_millis(1)))
            }
        }
        let manager2 = SamplingNetworkManager::new(DasSpec::minimal(), 0.0, -100.0, 100.0, 0.5);
        manager2.start();
        let _ = manager2.perform_sampling(Slot::new(9), 4, Some(&custody), &Counting(&calls), Some(&NoLocalStore));
        assert_eq!(*calls.lock().unwrap(), 4);
    }
}
