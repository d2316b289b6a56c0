use crate::errors::ReconstructionError;
use crate::fr::Fr;
use crate::poly::{evaluate_polynomial, reconstruct_polynomial};
use das_crypto::cell_proof;
use types::DasSpec;

/// High byte ceiling shared with the rest of the workspace's field-element convention (a 32-byte
/// big-endian value is only guaranteed to reduce to itself, never wrap, below this).
const HIGH_BYTE_CEILING: u8 = 0x73;

/// Reads 32-byte big-endian windows out of a cell. `strict` additionally rejects any window
/// whose high byte is `>= HIGH_BYTE_CEILING` (§4.6).
pub fn cell_to_field_elements(cell: &[u8], strict: bool) -> Result<Vec<Fr>, ReconstructionError> {
    if cell.len() % 32 != 0 {
        return Err(ReconstructionError::UnalignedCellLength);
    }
    let mut out = Vec::with_capacity(cell.len() / 32);
    for chunk in cell.chunks(32) {
        if strict && chunk[0] >= HIGH_BYTE_CEILING {
            return Err(ReconstructionError::HighByteViolation);
        }
        let bytes: [u8; 32] = chunk.try_into().expect("chunked by 32");
        out.push(Fr::from_bytes_be(&bytes));
    }
    Ok(out)
}

/// Inverse of [`cell_to_field_elements`]: concatenates big-endian element encodings and
/// left-zero-pads to `target_size`.
pub fn field_elements_to_bytes(elements: &[Fr], target_size: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(elements.len() * 32);
    for e in elements {
        out.extend_from_slice(&e.to_bytes_be());
    }
    if out.len() < target_size {
        let mut padded = vec![0u8; target_size - out.len()];
        padded.extend(out);
        padded
    } else {
        out.truncate(target_size);
        out
    }
}

fn elements_per_cell(spec: &DasSpec) -> usize {
    spec.bytes_per_cell / spec.bytes_per_field_element
}

/// Interpolates, row by row, the `elements_per_cell`-row extended matrix from `>= K` distinct
/// column cells, then evaluates it at every column index `0..N`. Returns the full `N`-cell
/// matrix as `matrix[column][row]`.
fn recover_matrix(
    cells: &[Vec<u8>],
    indices: &[u64],
    spec: &DasSpec,
) -> Result<Vec<Vec<Fr>>, ReconstructionError> {
    if cells.is_empty() {
        return Err(ReconstructionError::NoCells);
    }
    if cells.len() != indices.len() {
        return Err(ReconstructionError::LengthMismatch);
    }
    let k = spec.reconstruction_threshold as usize;
    if cells.len() < k {
        return Err(ReconstructionError::InsufficientCells);
    }
    let rows = elements_per_cell(spec);
    let n = spec.number_of_columns as usize;

    let decoded: Vec<Vec<Fr>> = cells
        .iter()
        .map(|c| cell_to_field_elements(c, false))
        .collect::<Result<_, _>>()?;
    for row in &decoded {
        if row.len() != rows {
            return Err(ReconstructionError::UnalignedCellLength);
        }
    }

    let xs: Vec<Fr> = indices.iter().map(|&i| Fr::from_u64(i)).collect();
    let mut matrix = vec![vec![Fr::ZERO; rows]; n];
    for row in 0..rows {
        let ys: Vec<Fr> = decoded.iter().map(|cell| cell[row]).collect();
        let coeffs = reconstruct_polynomial(&xs, &ys, k)?;
        for (col, slot) in matrix.iter_mut().enumerate() {
            slot[row] = evaluate_polynomial(&coeffs, Fr::from_u64(col as u64));
        }
    }
    Ok(matrix)
}

/// Reconstructs the original blob bytes from `>= ReconstructionThreshold` distinct column cells
/// at the given indices (§4.6). All-zero cells reconstruct to an all-zero blob.
pub fn reconstruct_blob(
    cells: &[Vec<u8>],
    indices: &[u64],
    spec: &DasSpec,
) -> Result<Vec<u8>, ReconstructionError> {
    let matrix = recover_matrix(cells, indices, spec)?;
    let k = spec.reconstruction_threshold as usize;
    let mut elements = Vec::with_capacity(k * elements_per_cell(spec));
    for col_cells in matrix.into_iter().take(k) {
        elements.extend(col_cells);
    }
    Ok(field_elements_to_bytes(&elements, spec.bytes_per_blob()))
}

/// Recovers every column's cell bytes plus its recomputed cell proof, given `row` (the blob's
/// position in the per-slot matrix) for proof domain separation.
pub fn recover_cells_and_proofs(
    cells: &[Vec<u8>],
    indices: &[u64],
    row: u64,
    spec: &DasSpec,
) -> Result<Vec<(Vec<u8>, [u8; 32])>, ReconstructionError> {
    let matrix = recover_matrix(cells, indices, spec)?;
    Ok(matrix
        .into_iter()
        .enumerate()
        .map(|(column, elements)| {
            let bytes = field_elements_to_bytes(&elements, spec.bytes_per_cell);
            let proof = cell_proof(column as u64, row, &bytes);
            (bytes, proof)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_spec_with_cell_width() -> DasSpec {
        // A spec small enough to exercise reconstruction without mainnet-sized work: K=4
        // columns of 2 field elements each (64 bytes/cell), N=8.
        DasSpec {
            number_of_columns: 8,
            reconstruction_threshold: 4,
            samples_per_slot: 2,
            custody_requirement: 1,
            number_of_custody_groups: 8,
            data_column_sidecar_subnet_count: 4,
            bytes_per_cell: 64,
            field_elements_per_blob: 8, // K(4) * elements_per_cell(2)
            bytes_per_field_element: 32,
            custody_retention_epochs: 4,
            slots_per_epoch: 8,
        }
    }

    #[test]
    fn field_element_round_trip_through_a_cell() {
        let spec = minimal_spec_with_cell_width();
        let elements = vec![Fr::from_u64(5), Fr::from_u64(9000)];
        let bytes = field_elements_to_bytes(&elements, spec.bytes_per_cell);
        let back = cell_to_field_elements(&bytes, false).unwrap();
        assert_eq!(back, elements);
    }

    #[test]
    fn zero_cells_reconstruct_to_a_zero_blob() {
        let spec = minimal_spec_with_cell_width();
        let k = spec.reconstruction_threshold as usize;
        let cells: Vec<Vec<u8>> = (0..k).map(|_| vec![0u8; spec.bytes_per_cell]).collect();
        let indices: Vec<u64> = (0..k as u64).collect();
        let blob = reconstruct_blob(&cells, &indices, &spec).unwrap();
        assert_eq!(blob.len(), spec.bytes_per_blob());
        assert!(blob.iter().all(|&b| b == 0));
    }

    #[test]
    fn reconstruction_round_trips_a_known_extension() {
        let spec = minimal_spec_with_cell_width();
        let n = spec.number_of_columns as usize;
        let rows = elements_per_cell(&spec);
        // Build a ground-truth degree-<K polynomial per row, evaluate it at every column to
        // produce the "real" extended matrix, then reconstruct from an arbitrary K-subset.
        let k = spec.reconstruction_threshold as usize;
        let mut coeffs_per_row = Vec::with_capacity(rows);
        for row in 0..rows {
            coeffs_per_row.push(vec![Fr::from_u64((row as u64) * 7 + 3); k]);
        }
        let full_matrix: Vec<Vec<Fr>> = (0..n)
            .map(|col| {
                coeffs_per_row
                    .iter()
                    .map(|coeffs| evaluate_polynomial(coeffs, Fr::from_u64(col as u64)))
                    .collect()
            })
            .collect();

        let indices: Vec<u64> = (0..k as u64).collect();
        let cells: Vec<Vec<u8>> = indices
            .iter()
            .map(|&i| field_elements_to_bytes(&full_matrix[i as usize], spec.bytes_per_cell))
            .collect();

        let blob = reconstruct_blob(&cells, &indices, &spec).unwrap();

        let mut expected = Vec::new();
        for col_cells in full_matrix.iter().take(k) {
            expected.extend(col_cells.iter().map(|e| e.to_bytes_be()));
        }
        let expected_bytes: Vec<u8> = expected.into_iter().flatten().collect();
        assert_eq!(blob, expected_bytes);
    }

    #[test]
    fn recover_cells_and_proofs_matches_the_cell_proof_scheme() {
        let spec = minimal_spec_with_cell_width();
        let k = spec.reconstruction_threshold as usize;
        let cells: Vec<Vec<u8>> = (0..k).map(|_| vec![0u8; spec.bytes_per_cell]).collect();
        let indices: Vec<u64> = (0..k as u64).collect();
        let recovered = recover_cells_and_proofs(&cells, &indices, 0, &spec).unwrap();
        assert_eq!(recovered.len(), spec.number_of_columns as usize);
        for (column, (bytes, proof)) in recovered.iter().enumerate() {
            assert_eq!(*proof, cell_proof(column as u64, 0, bytes));
        }
    }

    #[test]
    fn rejects_fewer_cells_than_the_reconstruction_threshold() {
        let spec = minimal_spec_with_cell_width();
        let cells = vec![vec![0u8; spec.bytes_per_cell]];
        let indices = vec![0u64];
        assert_eq!(
            reconstruct_blob(&cells, &indices, &spec),
            Err(ReconstructionError::InsufficientCells)
        );
    }
}
