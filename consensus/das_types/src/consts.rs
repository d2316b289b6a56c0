/// Chain-wide constants governing data availability sampling, collected into a single
/// config-time struct so that implementations can be exercised against non-mainnet
/// parameters in tests (mirrors the teacher's `ChainSpec` pattern).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DasSpec {
    /// `N` — width of the extended data matrix.
    pub number_of_columns: u64,
    /// `K` — minimum distinct cells per blob required to reconstruct.
    pub reconstruction_threshold: u64,
    /// `S` — columns sampled per slot.
    pub samples_per_slot: u64,
    /// `R` — minimum custody groups per honest node.
    pub custody_requirement: u64,
    /// Total number of custody groups columns are partitioned into.
    pub number_of_custody_groups: u64,
    /// Number of gossip subnets carrying column sidecars.
    pub data_column_sidecar_subnet_count: u64,
    /// Bytes per cell.
    pub bytes_per_cell: usize,
    /// Field elements per (unextended) blob.
    pub field_elements_per_blob: usize,
    /// Bytes per BLS12-381 scalar field element.
    pub bytes_per_field_element: usize,
    /// Epochs after deactivation a custody epoch state is retained before eviction.
    pub custody_retention_epochs: u64,
    /// Slots per epoch, used by `Slot::epoch`.
    pub slots_per_epoch: u64,
}

impl DasSpec {
    /// `CellsPerExtBlob = N`.
    pub fn cells_per_ext_blob(&self) -> u64 {
        self.number_of_columns
    }

    /// Size in bytes of a fully reconstructed blob.
    pub fn bytes_per_blob(&self) -> usize {
        self.field_elements_per_blob * self.bytes_per_field_element
    }

    /// Number of columns represented by one custody group.
    ///
    /// Panics if `number_of_columns` is not a multiple of `number_of_custody_groups`;
    /// both are config-time constants checked once at construction.
    pub fn columns_per_group(&self) -> u64 {
        self.number_of_columns / self.number_of_custody_groups
    }

    pub fn subnet_for_column(&self, column: u64) -> u64 {
        column % self.data_column_sidecar_subnet_count
    }

    /// Mainnet-shaped defaults (`N=128, K=64, S=8, R=4`).
    pub fn mainnet() -> Self {
        Self {
            number_of_columns: 128,
            reconstruction_threshold: 64,
            samples_per_slot: 8,
            custody_requirement: 4,
            number_of_custody_groups: 128,
            data_column_sidecar_subnet_count: 128,
            bytes_per_cell: 2048,
            field_elements_per_blob: 4096,
            bytes_per_field_element: 32,
            custody_retention_epochs: 64,
            slots_per_epoch: 32,
        }
    }

    /// A scaled-down spec useful for fast, deterministic unit tests.
    pub fn minimal() -> Self {
        Self {
            number_of_columns: 16,
            reconstruction_threshold: 8,
            samples_per_slot: 4,
            custody_requirement: 2,
            number_of_custody_groups: 16,
            data_column_sidecar_subnet_count: 8,
            bytes_per_cell: 2048,
            field_elements_per_blob: 4096,
            bytes_per_field_element: 32,
            custody_retention_epochs: 4,
            slots_per_epoch: 8,
        }
    }
}

impl Default for DasSpec {
    fn default() -> Self {
        Self::mainnet()
    }
}
