use crate::custody_context::compute_custody_columns;
use crate::errors::CustodyError;
use parking_lot::RwLock;
use std::collections::HashMap;
use types::{ColumnIndex, DasSpec, NodeId};

struct PeerRecord {
    columns: Vec<ColumnIndex>,
}

/// Tracks which peers custody which columns. `RegisterPeer` computes the peer's custody set and
/// indexes it by column; `FindPeersForColumn` hands back a defensive copy so callers can't
/// mutate the directory's internal lists.
pub struct PeerDirectory {
    spec: DasSpec,
    peers: RwLock<HashMap<NodeId, PeerRecord>>,
    column_to_peers: RwLock<HashMap<ColumnIndex, Vec<NodeId>>>,
}

impl PeerDirectory {
    pub fn new(spec: DasSpec) -> Self {
        Self {
            spec,
            peers: RwLock::new(HashMap::new()),
            column_to_peers: RwLock::new(HashMap::new()),
        }
    }

    pub fn register_peer(&self, node_id: NodeId, group_count: u64) {
        let columns = compute_custody_columns(&node_id, group_count, &self.spec);

        let mut column_to_peers = self.column_to_peers.write();
        for &c in &columns {
            let entry = column_to_peers.entry(c).or_default();
            if !entry.contains(&node_id) {
                entry.push(node_id);
            }
        }
        drop(column_to_peers);

        self.peers.write().insert(node_id, PeerRecord { columns });
    }

    pub fn unregister_peer(&self, node_id: &NodeId) {
        let Some(record) = self.peers.write().remove(node_id) else {
            return;
        };
        let mut column_to_peers = self.column_to_peers.write();
        for c in &record.columns {
            if let Some(list) = column_to_peers.get_mut(c) {
                list.retain(|p| p != node_id);
                if list.is_empty() {
                    column_to_peers.remove(c);
                }
            }
        }
    }

    /// Returns a defensive copy of the peers known to custody `column`.
    pub fn find_peers_for_column(&self, column: ColumnIndex) -> Result<Vec<NodeId>, CustodyError> {
        let column_to_peers = self.column_to_peers.read();
        match column_to_peers.get(&column) {
            Some(peers) if !peers.is_empty() => Ok(peers.clone()),
            _ => Err(CustodyError::NoPeersForColumn(column)),
        }
    }

    pub fn peer_count(&self) -> usize {
        self.peers.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(seed: u8) -> NodeId {
        let mut bytes = [0u8; 32];
        bytes[0] = seed;
        NodeId::new(bytes)
    }

    #[test]
    fn register_then_find_peers_for_column() {
        let spec = DasSpec::minimal();
        let dir = PeerDirectory::new(spec.clone());
        dir.register_peer(node(1), spec.number_of_custody_groups);
        let columns = compute_custody_columns(&node(1), spec.number_of_custody_groups, &spec);
        for c in columns {
            let peers = dir.find_peers_for_column(c).unwrap();
            assert!(peers.contains(&node(1)));
        }
    }

    #[test]
    fn unknown_column_returns_no_peers_error() {
        let spec = DasSpec::minimal();
        let dir = PeerDirectory::new(spec.clone());
        assert!(matches!(
            dir.find_peers_for_column(0),
            Err(CustodyError::NoPeersForColumn(0))
        ));
    }

    #[test]
    fn unregister_removes_peer_from_every_column() {
        let spec = DasSpec::minimal();
        let dir = PeerDirectory::new(spec.clone());
        dir.register_peer(node(2), spec.number_of_custody_groups);
        let columns = compute_custody_columns(&node(2), spec.number_of_custody_groups, &spec);
        dir.unregister_peer(&node(2));
        for c in columns {
            assert!(dir.find_peers_for_column(c).is_err());
        }
        assert_eq!(dir.peer_count(), 0);
    }
}
