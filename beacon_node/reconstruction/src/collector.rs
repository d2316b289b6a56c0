use crate::errors::ReconstructionError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Instant;
use types::{BlobIndex, Commitment, ColumnIndex, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Low,
    Normal,
    High,
}

/// Per-`(slot, blobIndex)` collection state (§4.5). Cells arrive in any order from gossip or
/// sampling; reconstruction only runs once enough distinct columns are present.
pub struct BlobState {
    pub priority: Priority,
    pub commitment: Commitment,
    pub cells: HashMap<ColumnIndex, Vec<u8>>,
    pub started_at: Instant,
    pub completed_at: Option<Instant>,
    pub error: Option<ReconstructionError>,
    pub reconstructed: bool,
    pub data: Option<Vec<u8>>,
}

impl BlobState {
    fn new(priority: Priority, commitment: Commitment) -> Self {
        Self {
            priority,
            commitment,
            cells: HashMap::new(),
            started_at: Instant::now(),
            completed_at: None,
            error: None,
            reconstructed: false,
            data: None,
        }
    }

    pub fn readiness(&self, threshold: usize) -> f64 {
        if threshold == 0 {
            return 1.0;
        }
        (self.cells.len() as f64 / threshold as f64).min(1.0)
    }
}

/// Accumulates cells per blob across gossip and sampling, feeding the reconstruction scheduler
/// and pipeline (C7).
pub struct CellCollector {
    states: RwLock<HashMap<(u64, BlobIndex), BlobState>>,
}

impl Default for CellCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl CellCollector {
    pub fn new() -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
        }
    }

    /// Idempotent: a second `init_blob` for an already-known `(slot, blob)` is a no-op.
    pub fn init_blob(&self, slot: Slot, blob: BlobIndex, priority: Priority, commitment: Commitment) {
        let mut states = self.states.write();
        states
            .entry((slot.as_u64(), blob))
            .or_insert_with(|| BlobState::new(priority, commitment));
    }

    pub fn add_cell(
        &self,
        slot: Slot,
        blob: BlobIndex,
        column: ColumnIndex,
        data: Vec<u8>,
    ) -> Result<(), ReconstructionError> {
        let mut states = self.states.write();
        let state = states
            .get_mut(&(slot.as_u64(), blob))
            .ok_or(ReconstructionError::UnknownBlob)?;
        if state.cells.contains_key(&column) {
            return Err(ReconstructionError::DuplicateCell);
        }
        state.cells.insert(column, data);
        crate::metrics::inc_counter(&crate::metrics::CELLS_COLLECTED_TOTAL);
        Ok(())
    }

    pub fn cell_count(&self, slot: Slot, blob: BlobIndex) -> usize {
        self.states
            .read()
            .get(&(slot.as_u64(), blob))
            .map(|s| s.cells.len())
            .unwrap_or(0)
    }

    /// Returns the collected cells as `(cells, indices)` arrays, sorted by column index for
    /// determinism, and the blob's commitment.
    pub fn cells_and_indices(
        &self,
        slot: Slot,
        blob: BlobIndex,
    ) -> Result<(Vec<Vec<u8>>, Vec<u64>, Commitment), ReconstructionError> {
        let states = self.states.read();
        let state = states
            .get(&(slot.as_u64(), blob))
            .ok_or(ReconstructionError::UnknownBlob)?;
        if state.cells.is_empty() {
            return Err(ReconstructionError::NoCells);
        }
        let mut entries: Vec<(&ColumnIndex, &Vec<u8>)> = state.cells.iter().collect();
        entries.sort_by_key(|(col, _)| **col);
        let indices = entries.iter().map(|(col, _)| **col).collect();
        let cells = entries.into_iter().map(|(_, data)| data.clone()).collect();
        Ok((cells, indices, state.commitment))
    }

    pub fn mark_reconstructed(&self, slot: Slot, blob: BlobIndex, data: Vec<u8>) {
        let mut states = self.states.write();
        if let Some(state) = states.get_mut(&(slot.as_u64(), blob)) {
            state.reconstructed = true;
            state.data = Some(data);
            state.completed_at = Some(Instant::now());
            state.error = None;
        }
    }

    pub fn mark_failed(&self, slot: Slot, blob: BlobIndex, error: ReconstructionError) {
        let mut states = self.states.write();
        if let Some(state) = states.get_mut(&(slot.as_u64(), blob)) {
            state.error = Some(error);
            state.completed_at = Some(Instant::now());
        }
    }

    pub fn is_reconstructed(&self, slot: Slot, blob: BlobIndex) -> bool {
        self.states
            .read()
            .get(&(slot.as_u64(), blob))
            .map(|s| s.reconstructed)
            .unwrap_or(false)
    }

    pub fn is_errored(&self, slot: Slot, blob: BlobIndex) -> bool {
        self.states
            .read()
            .get(&(slot.as_u64(), blob))
            .map(|s| s.error.is_some())
            .unwrap_or(false)
    }

    pub fn priority(&self, slot: Slot, blob: BlobIndex) -> Option<Priority> {
        self.states.read().get(&(slot.as_u64(), blob)).map(|s| s.priority)
    }

    pub fn readiness(&self, slot: Slot, blob: BlobIndex, threshold: usize) -> f64 {
        self.states
            .read()
            .get(&(slot.as_u64(), blob))
            .map(|s| s.readiness(threshold))
            .unwrap_or(0.0)
    }

    /// All tracked `(slot, blob)` keys, for the scheduler to scan.
    pub fn tracked_keys(&self) -> Vec<(u64, BlobIndex)> {
        self.states.read().keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_blob_is_idempotent() {
        let collector = CellCollector::new();
        collector.init_blob(Slot::new(1), 0, Priority::Normal, Commitment::zero());
        collector
            .add_cell(Slot::new(1), 0, 3, vec![1, 2, 3])
            .unwrap();
        collector.init_blob(Slot::new(1), 0, Priority::High, Commitment::zero());
        // Re-init must not wipe already-collected cells.
        assert_eq!(collector.cell_count(Slot::new(1), 0), 1);
    }

    #[test]
    fn add_cell_rejects_uninitialized_blob() {
        let collector = CellCollector::new();
        let err = collector.add_cell(Slot::new(1), 0, 0, vec![1]).unwrap_err();
        assert_eq!(err, ReconstructionError::UnknownBlob);
    }

    #[test]
    fn add_cell_rejects_duplicate_column() {
        let collector = CellCollector::new();
        collector.init_blob(Slot::new(1), 0, Priority::Normal, Commitment::zero());
        collector.add_cell(Slot::new(1), 0, 2, vec![1]).unwrap();
        let err = collector.add_cell(Slot::new(1), 0, 2, vec![2]).unwrap_err();
        assert_eq!(err, ReconstructionError::DuplicateCell);
    }

    #[test]
    fn cells_and_indices_are_sorted_by_column() {
        let collector = CellCollector::new();
        collector.init_blob(Slot::new(1), 0, Priority::Normal, Commitment::zero());
        collector.add_cell(Slot::new(1), 0, 5, vec![5]).unwrap();
        collector.add_cell(Slot::new(1), 0, 1, vec![1]).unwrap();
        let (cells, indices, _) = collector.cells_and_indices(Slot::new(1), 0).unwrap();
        assert_eq!(indices, vec![1, 5]);
        assert_eq!(cells, vec![vec![1], vec![5]]);
    }
}
