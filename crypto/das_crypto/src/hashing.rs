use sha3::{Digest, Keccak256};
use types::NodeId;

/// Keccak-256 of `data`. The single concrete hash function `H(...)` used throughout the wire
/// encodings in this workspace — see §6 of the design notes for the bit-exact layouts.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

fn concat(parts: &[&[u8]]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(parts.iter().map(|p| p.len()).sum());
    for p in parts {
        buf.extend_from_slice(p);
    }
    buf
}

/// `H(slotLE || columnLE || data)`.
pub fn column_proof(slot: u64, column: u64, data: &[u8]) -> [u8; 32] {
    keccak256(&concat(&[&slot.to_le_bytes(), &column.to_le_bytes(), data]))
}

/// `H(columnLE || rowLE || data)`.
pub fn cell_proof(column: u64, row: u64, data: &[u8]) -> [u8; 32] {
    keccak256(&concat(&[&column.to_le_bytes(), &row.to_le_bytes(), data]))
}

/// `H(commitment || blobLE || cellLE || data)`.
pub fn sample_proof(commitment: &[u8; 32], blob_index: u64, cell_index: u64, data: &[u8]) -> [u8; 32] {
    keccak256(&concat(&[
        commitment,
        &blob_index.to_le_bytes(),
        &cell_index.to_le_bytes(),
        data,
    ]))
}

/// Sampling seed: `H(nodeID || slotLE)`.
pub fn sampling_seed(node_id: &NodeId, slot: u64) -> [u8; 32] {
    keccak256(&concat(&[node_id.as_bytes(), &slot.to_le_bytes()]))
}

/// One step of a hash-chain: `LE64(H(seed || counterLE))`, i.e. the first 8 bytes of the digest
/// interpreted as a little-endian integer.
pub fn hash_chain_step(seed: &[u8; 32], counter: u64) -> u64 {
    let digest = keccak256(&concat(&[seed, &counter.to_le_bytes()]));
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(buf)
}

/// Epoch-derived node identity: `H(nodeID || epochLE)`, used by custody rotation.
pub fn epoch_derived_node_id(node_id: &NodeId, epoch: u64) -> [u8; 32] {
    keccak256(&concat(&[node_id.as_bytes(), &epoch.to_le_bytes()]))
}

/// Fixed-domain-separator seed used by the network-level column choice (C10):
/// `H(slotLE || "das-sampling")`.
pub fn network_sampling_seed(slot: u64) -> [u8; 32] {
    keccak256(&concat(&[&slot.to_le_bytes(), b"das-sampling"]))
}

/// L2 commitment: `H(chainID_BE8 || data)`.
pub fn l2_commitment(chain_id: u64, data: &[u8]) -> [u8; 32] {
    keccak256(&concat(&[&chain_id.to_be_bytes(), data]))
}

/// Derives a sorted, duplicate-free set of `count` values in `[0, modulus)` by counter-hashing
/// `seed`, in the shape shared by `SelectColumns` (C6) and custody-group derivation (C5).
pub fn hash_chain_sample(seed: &[u8; 32], modulus: u64, count: usize) -> Vec<u64> {
    let mut out = Vec::with_capacity(count);
    let mut seen = std::collections::HashSet::with_capacity(count);
    let mut counter = 0u64;
    while out.len() < count {
        let val = hash_chain_step(seed, counter) % modulus;
        counter += 1;
        if seen.insert(val) {
            out.push(val);
        }
        if counter > modulus.saturating_mul(4).max(1024) {
            break;
        }
    }
    out.sort_unstable();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak256_is_deterministic() {
        assert_eq!(keccak256(b"hello"), keccak256(b"hello"));
        assert_ne!(keccak256(b"hello"), keccak256(b"world"));
    }

    #[test]
    fn column_proof_matches_manual_concatenation() {
        let data = b"cell-bytes";
        let expected = keccak256(&concat(&[&7u64.to_le_bytes(), &3u64.to_le_bytes(), data]));
        assert_eq!(column_proof(7, 3, data), expected);
    }

    #[test]
    fn hash_chain_sample_is_sorted_unique_and_in_range() {
        let seed = keccak256(b"seed");
        let out = hash_chain_sample(&seed, 128, 8);
        assert_eq!(out.len(), 8);
        let mut sorted = out.clone();
        sorted.sort_unstable();
        assert_eq!(out, sorted);
        let unique: std::collections::HashSet<_> = out.iter().collect();
        assert_eq!(unique.len(), out.len());
        assert!(out.iter().all(|v| *v < 128));
    }

    #[test]
    fn hash_chain_sample_is_deterministic_across_calls() {
        let seed = keccak256(b"seed-2");
        let a = hash_chain_sample(&seed, 128, 8);
        let b = hash_chain_sample(&seed, 128, 8);
        assert_eq!(a, b);
    }
}
