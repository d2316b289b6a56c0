use crate::errors::TeragasError;
use crate::packet::TpDataPacket;
use bandwidth::ChainId;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Reassembles chunked `TpDataPacket`s keyed by `(ChainID, TimestampNanos)` (§4.12). The key
/// assumes no two in-flight chunk sets from the same chain share a timestamp; callers that
/// chunk faster than their clock's resolution must bump the nanosecond field to disambiguate.
#[derive(Default)]
pub struct ReassemblyStore {
    partial: RwLock<HashMap<(ChainId, u64), PartialEntry>>,
}

struct PartialEntry {
    total_chunks: u32,
    chunks: HashMap<u32, Vec<u8>>,
}

impl ReassemblyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingests one chunk. Returns `Ok(Some(data))` once every chunk for the key has arrived,
    /// `Ok(None)` while chunks are still outstanding.
    pub fn ingest(&self, packet: &TpDataPacket) -> Result<Option<Vec<u8>>, TeragasError> {
        if !packet.is_chunked || packet.total_chunks <= 1 {
            return Ok(Some(packet.data.clone()));
        }
        let key = (packet.chain_id, packet.timestamp_nanos);
        let mut partial = self.partial.write();
        let entry = partial.entry(key).or_insert_with(|| PartialEntry {
            total_chunks: packet.total_chunks,
            chunks: HashMap::new(),
        });
        entry.chunks.insert(packet.chunk_index, packet.data.clone());

        if entry.chunks.len() < entry.total_chunks as usize {
            return Ok(None);
        }

        let total_chunks = entry.total_chunks;
        let entry = partial.remove(&key).expect("just inserted above");
        let mut out = Vec::new();
        for i in 0..total_chunks {
            match entry.chunks.get(&i) {
                Some(chunk) => out.extend_from_slice(chunk),
                None => return Err(TeragasError::ReassemblyFailed),
            }
        }
        Ok(Some(out))
    }

    pub fn pending_keys(&self) -> usize {
        self.partial.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(chain: ChainId, ts: u64, index: u32, total: u32, data: &[u8]) -> TpDataPacket {
        TpDataPacket {
            chain_id: chain,
            data: data.to_vec(),
            chunk_index: index,
            total_chunks: total,
            is_chunked: true,
            compressed: false,
            orig_size: data.len(),
            timestamp_nanos: ts,
        }
    }

    #[test]
    fn emits_only_once_every_chunk_has_arrived() {
        let store = ReassemblyStore::new();
        assert_eq!(store.ingest(&chunk(1, 100, 0, 2, b"ab")).unwrap(), None);
        assert_eq!(store.pending_keys(), 1);
        let result = store.ingest(&chunk(1, 100, 1, 2, b"cd")).unwrap();
        assert_eq!(result, Some(b"abcd".to_vec()));
        assert_eq!(store.pending_keys(), 0);
    }

    #[test]
    fn distinct_timestamps_do_not_interfere() {
        let store = ReassemblyStore::new();
        store.ingest(&chunk(1, 100, 0, 2, b"aa")).unwrap();
        store.ingest(&chunk(1, 200, 0, 2, b"bb")).unwrap();
        assert_eq!(store.pending_keys(), 2);
    }

    #[test]
    fn unchunked_packets_pass_straight_through() {
        let store = ReassemblyStore::new();
        let packet = TpDataPacket::new(1, b"hello".to_vec(), 1);
        assert_eq!(store.ingest(&packet).unwrap(), Some(b"hello".to_vec()));
        assert_eq!(store.pending_keys(), 0);
    }
}
