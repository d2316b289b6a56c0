use crate::errors::SamplingError;
use das_crypto::sampling_seed;
use types::{ColumnIndex, DasSpec, NodeId, Slot};

/// `SelectColumns(slot) → []ColumnIndex` per §4.4: a hash-chain sample of size `SamplesPerSlot`,
/// seeded by `H(nodeID || slotLE)`. Slot 0 is rejected — there is no meaningful sampling seed at
/// genesis.
pub fn select_columns(
    node_id: &NodeId,
    slot: Slot,
    spec: &DasSpec,
) -> Result<Vec<ColumnIndex>, SamplingError> {
    if slot.as_u64() == 0 {
        return Err(SamplingError::ZeroSlot);
    }
    let seed = sampling_seed(node_id, slot.as_u64());
    Ok(das_crypto::hash_chain_sample(
        &seed,
        spec.number_of_columns,
        spec.samples_per_slot as usize,
    ))
}
