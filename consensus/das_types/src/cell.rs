use crate::primitives::{BlobIndex, ColumnIndex, Commitment, CustodyIndex, NodeId, SubnetId};
use crate::slot_epoch::{Epoch, Slot};
use serde::{Deserialize, Serialize};

/// A single cell of a data column. Immutable once produced; `bytes.len()` always equals the
/// governing `DasSpec::bytes_per_cell`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub bytes: Vec<u8>,
}

impl Cell {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn zeroed(bytes_per_cell: usize) -> Self {
        Self {
            bytes: vec![0u8; bytes_per_cell],
        }
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell").field("len", &self.bytes.len()).finish()
    }
}

/// An ordered sequence of cells, one per blob row, identified by `ColumnIndex`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Column {
    pub index: ColumnIndex,
    pub cells: Vec<Cell>,
}

/// A single sample as defined in §3: the cell data plus its inclusion proof.
///
/// Proof contract (enforced by `das_crypto`, not this crate): `proof == H(column_index ||
/// blob_index || data)` with little-endian 8-byte integers preceding the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub blob_index: BlobIndex,
    pub cell_index: ColumnIndex,
    pub data: Vec<u8>,
    pub proof: [u8; 32],
}

/// A node's derived custody/sampling footprint. Every field is purely derived from `node_id` and
/// the governing epoch/spec — never user-supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetAssignment {
    pub node_id: NodeId,
    pub custody_groups: Vec<CustodyIndex>,
    pub subnet_ids: Vec<SubnetId>,
    pub column_indices: Vec<ColumnIndex>,
}

/// A bandwidth grant: `Size` bytes usable by `PeerID` until `Deadline`, consumable exactly once.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub size: u64,
    pub deadline: std::time::Instant,
    pub granted: bool,
    pub peer_id: String,
    consumed: bool,
}

impl Reservation {
    pub fn new(size: u64, deadline: std::time::Instant, peer_id: String) -> Self {
        Self {
            size,
            deadline,
            granted: true,
            peer_id,
            consumed: false,
        }
    }

    /// Consumes the reservation if unexpired and not already consumed. Returns `true` exactly
    /// once across the lifetime of a reservation.
    pub fn consume(&mut self, now: std::time::Instant) -> bool {
        if self.consumed || now > self.deadline {
            return false;
        }
        self.consumed = true;
        true
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

/// Per-slot column availability accounting.
#[derive(Debug, Clone, Default)]
pub struct ColumnAvailability {
    pub slot: Slot,
    pub required_columns: Vec<ColumnIndex>,
    pub downloaded_columns: Vec<ColumnIndex>,
    pub verified_columns: Vec<ColumnIndex>,
}

impl ColumnAvailability {
    pub fn score(&self) -> f64 {
        if self.required_columns.is_empty() {
            return 1.0;
        }
        self.verified_columns.len() as f64 / self.required_columns.len() as f64
    }

    pub fn available(&self) -> bool {
        !self.required_columns.is_empty() && self.verified_columns.len() >= self.required_columns.len()
    }
}

/// Verdict of a slot's sampling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotVerdict {
    Pending,
    Available,
    Unavailable,
}

impl Default for SlotVerdict {
    fn default() -> Self {
        SlotVerdict::Pending
    }
}

/// Aggregate result of sampling a single slot.
#[derive(Debug, Clone, Default)]
pub struct SlotSamplingStatus {
    pub slot: Slot,
    pub required: usize,
    pub downloaded: usize,
    pub verified: usize,
    pub failed: usize,
    pub verdict: SlotVerdict,
}

/// Per-epoch custody footprint, mutated only via initialize/rotate. Inactive states beyond a
/// retention window (`DasSpec::custody_retention_epochs`) are evicted by the owning context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustodyEpochState {
    pub epoch: Epoch,
    pub groups: Vec<CustodyIndex>,
    pub columns: Vec<ColumnIndex>,
    pub active: bool,
    pub activated_at: Epoch,
    pub deactivated_at: Option<Epoch>,
}
