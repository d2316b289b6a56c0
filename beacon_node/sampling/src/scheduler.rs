use crate::errors::SamplingError;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use types::{ColumnIndex, NodeId, Slot, SlotVerdict};

const DEFAULT_SUCCESS_RATE: f64 = 0.5;
const MIN_SUCCESS_RATE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnStatus {
    Pending,
    Succeeded,
    Failed,
}

struct ColumnState {
    status: ColumnStatus,
    retries: u32,
    tried_peers: HashSet<NodeId>,
}

impl ColumnState {
    fn new() -> Self {
        Self {
            status: ColumnStatus::Pending,
            retries: 0,
            tried_peers: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PeerStats {
    success_rate: f64,
    avg_latency_ms: f64,
}

impl Default for PeerStats {
    fn default() -> Self {
        Self {
            success_rate: DEFAULT_SUCCESS_RATE,
            avg_latency_ms: 1.0,
        }
    }
}

impl PeerStats {
    fn score(&self) -> f64 {
        self.success_rate.max(MIN_SUCCESS_RATE) / self.avg_latency_ms.max(1.0)
    }

    fn record(&mut self, ok: bool, latency_ms: f64) {
        let sample = if ok { 1.0 } else { 0.0 };
        self.success_rate = self.success_rate * 0.8 + sample * 0.2;
        self.avg_latency_ms = self.avg_latency_ms * 0.8 + latency_ms * 0.2;
    }
}

#[derive(Debug, Clone)]
pub struct PeerColumnAssignment {
    pub column: ColumnIndex,
    pub peer: NodeId,
    pub deadline: Instant,
}

/// Peer sampling scheduler (§4.10): assigns one peer per required column, tracks per-column
/// retry state and per-peer success-rate/latency, and derives the slot's overall verdict.
pub struct SamplingScheduler {
    max_retries: u32,
    sample_timeout: Duration,
    failure_threshold: f64,
    peers: RwLock<HashMap<NodeId, PeerStats>>,
    columns: RwLock<HashMap<(u64, ColumnIndex), ColumnState>>,
}

impl SamplingScheduler {
    pub fn new(max_retries: u32, sample_timeout: Duration, failure_threshold: f64) -> Self {
        Self {
            max_retries,
            sample_timeout,
            failure_threshold,
            peers: RwLock::new(HashMap::new()),
            columns: RwLock::new(HashMap::new()),
        }
    }

    fn best_peer<'a>(
        &self,
        column: ColumnIndex,
        peers: &'a [NodeId],
        custodians: Option<&HashMap<ColumnIndex, Vec<NodeId>>>,
        exclude: &HashSet<NodeId>,
    ) -> Option<NodeId> {
        let custodying: HashSet<&NodeId> = custodians
            .and_then(|c| c.get(&column))
            .map(|v| v.iter().collect())
            .unwrap_or_default();

        let stats = self.peers.read();
        let candidates: Vec<&NodeId> = peers.iter().filter(|p| !exclude.contains(*p)).collect();

        let score_of = |p: &NodeId| stats.get(p).copied().unwrap_or_default().score();

        let mut pool: Vec<&&NodeId> = candidates
            .iter()
            .filter(|p| custodying.is_empty() || custodying.contains(**p))
            .collect();
        if pool.is_empty() {
            pool = candidates.iter().collect();
        }

        pool.into_iter()
            .max_by(|a, b| score_of(a).partial_cmp(&score_of(b)).unwrap())
            .map(|p| (**p).clone())
    }

    /// `ScheduleSampling(slot, columns, peers)`: one assignment per column, preferring custodying
    /// peers, then by `successRate / max(latencyMs, 1)`.
    pub fn schedule_sampling(
        &self,
        slot: Slot,
        columns: &[ColumnIndex],
        peers: &[NodeId],
        custodians: Option<&HashMap<ColumnIndex, Vec<NodeId>>>,
    ) -> Result<Vec<PeerColumnAssignment>, SamplingError> {
        if peers.is_empty() {
            return Err(SamplingError::EmptyPeers);
        }
        if columns.is_empty() {
            return Err(SamplingError::EmptyColumns);
        }

        let deadline = Instant::now() + self.sample_timeout;
        let mut assignments = Vec::with_capacity(columns.len());
        let mut cols = self.columns.write();

        for &column in columns {
            let exclude = HashSet::new();
            let Some(peer) = self.best_peer(column, peers, custodians, &exclude) else {
                continue;
            };
            cols.entry((slot.as_u64(), column)).or_insert_with(ColumnState::new);
            assignments.push(PeerColumnAssignment { column, peer, deadline });
        }

        Ok(assignments)
    }

    /// `TrackResult(slot, col, peer, ok, latency)`: updates peer stats and per-column retry
    /// state, marking the column permanently failed once `retries >= max_retries`.
    pub fn track_result(&self, slot: Slot, col: ColumnIndex, peer: &NodeId, ok: bool, latency_ms: f64) {
        self.peers
            .write()
            .entry(peer.clone())
            .or_default()
            .record(ok, latency_ms);

        let mut cols = self.columns.write();
        let state = cols
            .entry((slot.as_u64(), col))
            .or_insert_with(ColumnState::new);

        if state.status != ColumnStatus::Pending {
            return;
        }

        if ok {
            state.status = ColumnStatus::Succeeded;
        } else {
            state.retries += 1;
            state.tried_peers.insert(peer.clone());
            if state.retries >= self.max_retries {
                state.status = ColumnStatus::Failed;
            }
        }
    }

    /// `RetryFailed(slot, peers)`: fresh assignments for columns that are still pending with
    /// retries remaining, excluding peers already tried for that column. A column with no
    /// untried peer left is marked permanently failed. Returned sorted by column index.
    pub fn retry_failed(
        &self,
        slot: Slot,
        peers: &[NodeId],
        custodians: Option<&HashMap<ColumnIndex, Vec<NodeId>>>,
    ) -> Vec<PeerColumnAssignment> {
        let deadline = Instant::now() + self.sample_timeout;
        let mut cols = self.columns.write();

        let pending_columns: Vec<ColumnIndex> = cols
            .iter()
            .filter(|(&(s, _), state)| s == slot.as_u64() && state.status == ColumnStatus::Pending)
            .map(|(&(_, c), _)| c)
            .collect();

        let mut assignments = Vec::new();
        for column in pending_columns {
            let state = cols.get(&(slot.as_u64(), column)).unwrap();
            let exclude = state.tried_peers.clone();
            match self.best_peer(column, peers, custodians, &exclude) {
                Some(peer) => assignments.push(PeerColumnAssignment { column, peer, deadline }),
                None => {
                    cols.get_mut(&(slot.as_u64(), column)).unwrap().status = ColumnStatus::Failed;
                }
            }
        }

        assignments.sort_by_key(|a| a.column);
        assignments
    }

    /// Overall verdict for `slot` given the number of columns the slot actually requires.
    pub fn slot_verdict(&self, slot: Slot, total_required: usize) -> SlotVerdict {
        if total_required == 0 {
            return SlotVerdict::Pending;
        }
        let cols = self.columns.read();
        let (succeeded, failed): (usize, usize) = cols
            .iter()
            .filter(|(&(s, _), _)| s == slot.as_u64())
            .fold((0, 0), |(ok, fail), (_, state)| match state.status {
                ColumnStatus::Succeeded => (ok + 1, fail),
                ColumnStatus::Failed => (ok, fail + 1),
                ColumnStatus::Pending => (ok, fail),
            });

        if succeeded == total_required {
            SlotVerdict::Available
        } else if (failed as f64) / (total_required as f64) > self.failure_threshold {
            SlotVerdict::Unavailable
        } else {
            SlotVerdict::Pending
        }
    }
}
