use crate::blob::{recover_cells_and_proofs, reconstruct_blob};
use crate::collector::CellCollector;
use crate::errors::ReconstructionError;
use crate::metrics;
use std::time::Instant;
use tracing::{debug, warn};
use types::{BlobIndex, DasSpec, Slot};

/// Runs the reconstruction primitive against a collector's accumulated cells and records the
/// outcome back onto it (§4.5). Fails fast on missing state, no cells, or too few cells.
pub fn reconstruct(
    collector: &CellCollector,
    spec: &DasSpec,
    slot: Slot,
    blob: BlobIndex,
) -> Result<Vec<u8>, ReconstructionError> {
    metrics::inc_counter(&metrics::RECONSTRUCT_ATTEMPTS_TOTAL);
    let start = Instant::now();

    let result = (|| {
        let (cells, indices, _commitment) = collector.cells_and_indices(slot, blob)?;
        let data = reconstruct_blob(&cells, &indices, spec)?;
        if data.len() != spec.bytes_per_blob() {
            return Err(ReconstructionError::OutputSizeMismatch);
        }
        Ok(data)
    })();

    metrics::inc_counter_by(
        &metrics::RECONSTRUCT_LATENCY_MS_TOTAL,
        start.elapsed().as_millis() as u64,
    );

    match result {
        Ok(data) => {
            metrics::inc_counter(&metrics::RECONSTRUCT_SUCCESSES_TOTAL);
            collector.mark_reconstructed(slot, blob, data.clone());
            debug!(slot = slot.as_u64(), blob, "blob reconstructed");
            Ok(data)
        }
        Err(err) => {
            metrics::inc_counter(&metrics::RECONSTRUCT_FAILURES_TOTAL);
            collector.mark_failed(slot, blob, err.clone());
            warn!(slot = slot.as_u64(), blob, error = %err, "blob reconstruction failed");
            Err(err)
        }
    }
}

/// Recovers every column's cell bytes and recomputed cell proof for a blob, without mutating
/// collector state (used by column-sidecar re-derivation rather than the primary pipeline).
pub fn reconstruct_with_proofs(
    collector: &CellCollector,
    spec: &DasSpec,
    slot: Slot,
    blob: BlobIndex,
) -> Result<Vec<(Vec<u8>, [u8; 32])>, ReconstructionError> {
    let (cells, indices, _commitment) = collector.cells_and_indices(slot, blob)?;
    recover_cells_and_proofs(&cells, &indices, blob, spec)
}
