use crate::errors::CustodyError;
use das_crypto::keccak256;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;
use types::{ColumnIndex, CustodyEpochState, CustodyIndex, DasSpec, Epoch, NodeId};

const MAX_ROTATION_HISTORY: usize = 64;

/// Derives `count` distinct custody group indices from `node_id` via a deterministic hash-chain,
/// matching `GetCustodyGroups` in §4.3.
fn get_custody_groups(node_id: &NodeId, count: u64, number_of_custody_groups: u64) -> Vec<CustodyIndex> {
    let seed = keccak256(node_id.as_bytes());
    das_crypto::hash_chain_sample(&seed, number_of_custody_groups, count as usize)
}

/// Expands a custody group into the column indices it covers. Groups are interleaved across the
/// matrix width: group `g` owns columns `g, g + groups, g + 2*groups, ...`.
fn compute_columns_for_custody_group(group: CustodyIndex, spec: &DasSpec) -> Vec<ColumnIndex> {
    let columns_per_group = spec.columns_per_group();
    (0..columns_per_group)
        .map(|k| group + k * spec.number_of_custody_groups)
        .collect()
}

/// `ComputeCustodyColumns(nodeID, groupCount, columnsPerGroup)` per §4.3: clamps `group_count`
/// into `[CustodyRequirement, NumberOfCustodyGroups]`, derives the custody group set, expands
/// each into its columns, and returns the sorted, deduplicated union.
pub fn compute_custody_columns(node_id: &NodeId, group_count: u64, spec: &DasSpec) -> Vec<ColumnIndex> {
    let clamped = group_count.clamp(spec.custody_requirement, spec.number_of_custody_groups);
    let groups = get_custody_groups(node_id, clamped, spec.number_of_custody_groups);
    let mut columns: Vec<ColumnIndex> = groups
        .iter()
        .flat_map(|g| compute_columns_for_custody_group(*g, spec))
        .collect();
    columns.sort_unstable();
    columns.dedup();
    columns
}

/// Result of a `RotateEpoch` call: the columns added and dropped relative to the previous active
/// state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustodyCountChanged {
    pub added: Vec<ColumnIndex>,
    pub dropped: Vec<ColumnIndex>,
}

struct Inner {
    active: Option<CustodyEpochState>,
    history: VecDeque<CustodyEpochState>,
}

/// Owns a node's custody footprint across epochs: the active assignment, rotation history
/// (capped at 64 events), and retention-windowed eviction of inactive states. Grounded on the
/// teacher's `CustodyContext`.
pub struct CustodyContext {
    node_id: NodeId,
    group_count: u64,
    spec: Arc<DasSpec>,
    inner: RwLock<Inner>,
}

impl CustodyContext {
    pub fn new(node_id: NodeId, group_count: u64, spec: Arc<DasSpec>) -> Self {
        Self {
            node_id,
            group_count,
            spec,
            inner: RwLock::new(Inner {
                active: None,
                history: VecDeque::new(),
            }),
        }
    }

    /// Initializes the active state at `epoch` without treating it as a rotation (no `Added`
    /// history entry beyond the initial activation).
    pub fn initialize(&self, epoch: Epoch) {
        let epoch_node_id = self.epoch_derived_node_id(epoch);
        let columns = compute_custody_columns(&epoch_node_id, self.group_count, &self.spec);
        let groups = get_custody_groups(&epoch_node_id, self.clamped_group_count(), self.spec.number_of_custody_groups);
        let state = CustodyEpochState {
            epoch,
            groups,
            columns,
            active: true,
            activated_at: epoch,
            deactivated_at: None,
        };
        let mut inner = self.inner.write();
        inner.active = Some(state);
    }

    fn clamped_group_count(&self) -> u64 {
        self.group_count
            .clamp(self.spec.custody_requirement, self.spec.number_of_custody_groups)
    }

    fn epoch_derived_node_id(&self, epoch: Epoch) -> NodeId {
        NodeId::new(das_crypto::epoch_derived_node_id(&self.node_id, epoch.as_u64()))
    }

    pub fn active_columns(&self) -> Vec<ColumnIndex> {
        self.inner
            .read()
            .active
            .as_ref()
            .map(|s| s.columns.clone())
            .unwrap_or_default()
    }

    pub fn active_epoch(&self) -> Option<Epoch> {
        self.inner.read().active.as_ref().map(|s| s.epoch)
    }

    /// Computes the new assignment from the epoch-derived node ID, records `Added`/`Dropped`,
    /// deactivates the previous state, installs the new one, and evicts any inactive state older
    /// than `RetentionEpochs`.
    pub fn rotate_epoch(&self, new_epoch: Epoch) -> CustodyCountChanged {
        let epoch_node_id = self.epoch_derived_node_id(new_epoch);
        let new_columns = compute_custody_columns(&epoch_node_id, self.group_count, &self.spec);
        let new_groups = get_custody_groups(
            &epoch_node_id,
            self.clamped_group_count(),
            self.spec.number_of_custody_groups,
        );

        let mut inner = self.inner.write();

        let old_columns = inner
            .active
            .as_ref()
            .map(|s| s.columns.clone())
            .unwrap_or_default();

        let added: Vec<ColumnIndex> = new_columns
            .iter()
            .filter(|c| !old_columns.contains(c))
            .copied()
            .collect();
        let dropped: Vec<ColumnIndex> = old_columns
            .iter()
            .filter(|c| !new_columns.contains(c))
            .copied()
            .collect();

        if let Some(mut old) = inner.active.take() {
            old.active = false;
            old.deactivated_at = Some(new_epoch);
            inner.history.push_back(old);
            while inner.history.len() > MAX_ROTATION_HISTORY {
                inner.history.pop_front();
            }
        }

        inner.active = Some(CustodyEpochState {
            epoch: new_epoch,
            groups: new_groups,
            columns: new_columns,
            active: true,
            activated_at: new_epoch,
            deactivated_at: None,
        });

        let retention = self.spec.custody_retention_epochs;
        inner.history.retain(|s| {
            s.active || new_epoch.as_u64().saturating_sub(s.epoch.as_u64()) <= retention
        });

        CustodyCountChanged { added, dropped }
    }

    pub fn history_len(&self) -> usize {
        self.inner.read().history.len()
    }

    /// Checks that every column in `columns` is present in the active custody assignment.
    pub fn validate_custody(&self, columns: &[ColumnIndex]) -> Result<(), CustodyError> {
        let active = self.active_columns();
        for c in columns {
            if !active.contains(c) {
                return Err(CustodyError::MissingCustodyColumn(*c));
            }
        }
        Ok(())
    }
}
