use crate::errors::TeragasError;
use crate::metrics;
use bandwidth::{BandwidthEnforcer, ChainId};
use das_crypto::l2_commitment;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use types::Slot;

#[derive(Debug, Clone)]
pub struct StoreReceipt {
    pub slot: Slot,
    pub chain_id: ChainId,
    pub size: usize,
}

struct Entry {
    data: Vec<u8>,
    receipt: StoreReceipt,
}

/// Higher-level user of `BandwidthEnforcer`: a `Hash -> (data, receipt)` store with a per-chain
/// reverse index and a running total-bytes counter (§4.12).
pub struct TeradataManager {
    enforcer: BandwidthEnforcer,
    entries: RwLock<HashMap<[u8; 32], Entry>>,
    by_chain: RwLock<HashMap<ChainId, Vec<[u8; 32]>>>,
    total_bytes: AtomicU64,
    next_slot: AtomicU64,
}

impl TeradataManager {
    pub fn new(enforcer: BandwidthEnforcer) -> Self {
        Self {
            enforcer,
            entries: RwLock::new(HashMap::new()),
            by_chain: RwLock::new(HashMap::new()),
            total_bytes: AtomicU64::new(0),
            next_slot: AtomicU64::new(0),
        }
    }

    /// Checks bandwidth before taking any lock, computes the commitment, advances the internal
    /// slot counter, then copies the data in and indexes it.
    pub fn store_l2_data(&self, chain_id: ChainId, data: Vec<u8>) -> Result<[u8; 32], TeragasError> {
        self.enforcer
            .allocate(chain_id, data.len() as u64)
            .map_err(|_| TeragasError::BandwidthDenied)?;

        let commitment = l2_commitment(chain_id, &data);
        let slot = Slot::new(self.next_slot.fetch_add(1, Ordering::SeqCst));
        let size = data.len();
        let receipt = StoreReceipt { slot, chain_id, size };

        self.entries.write().insert(commitment, Entry { data, receipt });
        self.by_chain.write().entry(chain_id).or_default().push(commitment);
        self.total_bytes.fetch_add(size as u64, Ordering::SeqCst);
        metrics::set_gauge(&metrics::TERADATA_TOTAL_BYTES, self.total_bytes() as i64);
        metrics::set_gauge(&metrics::TERADATA_ENTRIES, self.entries.read().len() as i64);
        Ok(commitment)
    }

    pub fn get(&self, commitment: &[u8; 32]) -> Option<(Vec<u8>, StoreReceipt)> {
        self.entries
            .read()
            .get(commitment)
            .map(|entry| (entry.data.clone(), entry.receipt.clone()))
    }

    pub fn for_chain(&self, chain_id: ChainId) -> Vec<[u8; 32]> {
        self.by_chain.read().get(&chain_id).cloned().unwrap_or_default()
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes.load(Ordering::SeqCst)
    }

    /// Removes entries whose receipt slot is older than `slot`.
    pub fn prune_old_data(&self, slot: Slot) -> usize {
        let mut entries = self.entries.write();
        let stale: Vec<[u8; 32]> = entries
            .iter()
            .filter(|(_, e)| e.receipt.slot < slot)
            .map(|(k, _)| *k)
            .collect();
        let mut by_chain = self.by_chain.write();
        let mut pruned_bytes = 0u64;
        for key in &stale {
            if let Some(entry) = entries.remove(key) {
                pruned_bytes += entry.size_bytes();
                if let Some(list) = by_chain.get_mut(&entry.receipt.chain_id) {
                    list.retain(|k| k != key);
                }
            }
        }
        self.total_bytes.fetch_sub(pruned_bytes, Ordering::SeqCst);
        metrics::set_gauge(&metrics::TERADATA_TOTAL_BYTES, self.total_bytes() as i64);
        metrics::set_gauge(&metrics::TERADATA_ENTRIES, entries.len() as i64);
        stale.len()
    }
}

impl Entry {
    fn size_bytes(&self) -> u64 {
        self.receipt.size as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> TeradataManager {
        TeradataManager::new(BandwidthEnforcer::new(1_000_000.0, 100_000.0, 8, 0.8, 0.95, 2.0).unwrap())
    }

    #[test]
    fn stores_and_retrieves_data_by_commitment() {
        let m = manager();
        let commitment = m.store_l2_data(1, b"hello".to_vec()).unwrap();
        let (data, receipt) = m.get(&commitment).unwrap();
        assert_eq!(data, b"hello");
        assert_eq!(receipt.chain_id, 1);
        assert_eq!(m.total_bytes(), 5);
    }

    #[test]
    fn tracks_a_per_chain_reverse_index() {
        let m = manager();
        let a = m.store_l2_data(7, b"a".to_vec()).unwrap();
        let b = m.store_l2_data(7, b"b".to_vec()).unwrap();
        let mut list = m.for_chain(7);
        list.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(list, expected);
    }

    #[test]
    fn prune_removes_entries_below_the_given_slot() {
        let m = manager();
        m.store_l2_data(1, b"old".to_vec()).unwrap(); // slot 0
        m.store_l2_data(1, b"new".to_vec()).unwrap(); // slot 1
        let pruned = m.prune_old_data(Slot::new(1));
        assert_eq!(pruned, 1);
        assert_eq!(m.total_bytes(), 3); // "new".len()
    }

    #[test]
    fn bandwidth_denial_surfaces_as_an_error() {
        let enforcer = BandwidthEnforcer::new(10.0, 10.0, 8, 0.1, 0.2, 2.0).unwrap();
        let m = TeradataManager::new(enforcer);
        let err = m.store_l2_data(1, vec![0u8; 1000]).unwrap_err();
        assert_eq!(err, TeragasError::BandwidthDenied);
    }
}
