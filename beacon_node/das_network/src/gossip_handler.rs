use crate::errors::NetworkError;
use crate::metrics;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet, VecDeque};
use types::{BlobIndex, CellIndex, DasSpec};

/// Pluggable acceptance check for an incoming cell (§4.7). The default mirrors the bounds/size
/// checks every cell must satisfy regardless of who supplied it.
pub trait CellValidator: Send + Sync {
    fn validate(&self, spec: &DasSpec, cell_index: CellIndex, data: &[u8]) -> bool;
}

pub struct DefaultCellValidator;

impl CellValidator for DefaultCellValidator {
    fn validate(&self, spec: &DasSpec, cell_index: CellIndex, data: &[u8]) -> bool {
        cell_index < spec.number_of_columns && !data.is_empty() && data.len() <= spec.bytes_per_cell
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellOutcome {
    Accepted { became_ready: bool },
    Duplicate,
    Rejected,
    DroppedReconstructed,
}

struct PendingBlob {
    cells: HashSet<CellIndex>,
    ready: bool,
}

/// Accumulates gossiped cells per blob until `ReconstructionThreshold` distinct indices have
/// arrived, then announces readiness exactly once. Cells for blobs already marked reconstructed
/// are silently dropped (§4.7).
pub struct CellGossipHandler {
    spec: DasSpec,
    validator: Box<dyn CellValidator>,
    pending: RwLock<HashMap<BlobIndex, PendingBlob>>,
    reconstructed: RwLock<HashSet<BlobIndex>>,
    ready_events: RwLock<Vec<BlobIndex>>,
    broadcast_queue: RwLock<VecDeque<(BlobIndex, CellIndex, Vec<u8>)>>,
    broadcast_capacity: usize,
    closed: RwLock<bool>,
}

impl CellGossipHandler {
    pub fn new(spec: DasSpec, broadcast_capacity: usize) -> Self {
        Self::with_validator(spec, broadcast_capacity, Box::new(DefaultCellValidator))
    }

    pub fn with_validator(spec: DasSpec, broadcast_capacity: usize, validator: Box<dyn CellValidator>) -> Self {
        Self {
            spec,
            validator,
            pending: RwLock::new(HashMap::new()),
            reconstructed: RwLock::new(HashSet::new()),
            ready_events: RwLock::new(Vec::new()),
            broadcast_queue: RwLock::new(VecDeque::new()),
            broadcast_capacity,
            closed: RwLock::new(false),
        }
    }

    pub fn mark_reconstructed(&self, blob: BlobIndex) {
        self.reconstructed.write().insert(blob);
    }

    pub fn on_cell_received(
        &self,
        blob: BlobIndex,
        cell_index: CellIndex,
        data: &[u8],
    ) -> Result<CellOutcome, NetworkError> {
        if *self.closed.read() {
            return Err(NetworkError::Closed);
        }
        if self.reconstructed.read().contains(&blob) {
            metrics::inc_counter(&metrics::CELLS_DROPPED_TOTAL);
            return Ok(CellOutcome::DroppedReconstructed);
        }
        if !self.validator.validate(&self.spec, cell_index, data) {
            return Ok(CellOutcome::Rejected);
        }

        let mut pending = self.pending.write();
        let entry = pending.entry(blob).or_insert_with(|| PendingBlob {
            cells: HashSet::new(),
            ready: false,
        });
        if !entry.cells.insert(cell_index) {
            metrics::inc_counter(&metrics::CELLS_DUPLICATE_TOTAL);
            return Ok(CellOutcome::Duplicate);
        }
        metrics::inc_counter(&metrics::CELLS_RECEIVED_TOTAL);

        let threshold = self.spec.reconstruction_threshold as usize;
        let became_ready = !entry.ready && entry.cells.len() >= threshold;
        if became_ready {
            entry.ready = true;
            drop(pending);
            self.ready_events.write().push(blob);
        }
        Ok(CellOutcome::Accepted { became_ready })
    }

    /// Drains and returns every `("ready", blobIndex)` transition observed so far.
    pub fn drain_ready_events(&self) -> Vec<BlobIndex> {
        std::mem::take(&mut *self.ready_events.write())
    }

    pub fn broadcast_cell(&self, blob: BlobIndex, cell_index: CellIndex, data: Vec<u8>) -> Result<(), NetworkError> {
        if *self.closed.read() {
            return Err(NetworkError::Closed);
        }
        if !self.validator.validate(&self.spec, cell_index, &data) {
            return Ok(());
        }
        let mut queue = self.broadcast_queue.write();
        if queue.len() >= self.broadcast_capacity {
            queue.pop_front();
        }
        queue.push_back((blob, cell_index, data));
        Ok(())
    }

    pub fn drain_broadcast_queue(&self) -> Vec<(BlobIndex, CellIndex, Vec<u8>)> {
        self.broadcast_queue.write().drain(..).collect()
    }

    /// Clears all accumulated state but leaves the handler open for further ingress.
    pub fn reset(&self) {
        self.pending.write().clear();
        self.reconstructed.write().clear();
        self.ready_events.write().clear();
        self.broadcast_queue.write().clear();
    }

    pub fn close(&self) {
        *self.closed.write() = true;
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.read()
    }
}
