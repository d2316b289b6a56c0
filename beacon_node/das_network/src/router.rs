use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use types::{CellIndex, NodeId, SubnetId};

/// Maps cell indices onto gossip subnets and renders their fixed topic string (§4.7).
pub struct GossipRouter {
    prefix: String,
    num_subnets: u64,
    subscriptions: RwLock<HashMap<SubnetId, HashSet<NodeId>>>,
}

impl GossipRouter {
    pub fn new(prefix: impl Into<String>, num_subnets: u64) -> Self {
        Self {
            prefix: prefix.into(),
            num_subnets,
            subscriptions: RwLock::new(HashMap::new()),
        }
    }

    pub fn subnet_for_cell(&self, cell_index: CellIndex) -> SubnetId {
        cell_index % self.num_subnets
    }

    pub fn topic(&self, subnet: SubnetId) -> String {
        format!("/{}/das/cell/subnet/{}", self.prefix, subnet)
    }

    pub fn register_node(&self, node_id: NodeId, subnets: &[SubnetId]) {
        let mut subs = self.subscriptions.write();
        for &s in subnets {
            subs.entry(s).or_default().insert(node_id);
        }
    }

    pub fn unregister_node(&self, node_id: &NodeId) {
        let mut subs = self.subscriptions.write();
        for set in subs.values_mut() {
            set.remove(node_id);
        }
        subs.retain(|_, set| !set.is_empty());
    }

    /// Explicitly-registered subscribers of `subnet`.
    pub fn subscribers(&self, subnet: SubnetId) -> Vec<NodeId> {
        self.subscriptions
            .read()
            .get(&subnet)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// A node is an acceptable broadcast target for `subnet` if it's explicitly registered, or
    /// if its on-demand-computed custody columns map to it — unregistered nodes are never turned
    /// away outright (§4.7).
    pub fn is_acceptable(&self, node_id: &NodeId, subnet: SubnetId, custody_columns: &[CellIndex]) -> bool {
        if self
            .subscriptions
            .read()
            .get(&subnet)
            .is_some_and(|set| set.contains(node_id))
        {
            return true;
        }
        custody_columns
            .iter()
            .any(|&c| self.subnet_for_cell(c) == subnet)
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
    fn subnet_for_cell_wraps_by_modulus() {
        let router = GossipRouter::new("das", 8);
        assert_eq!(router.subnet_for_cell(0), 0);
        assert_eq!(router.subnet_for_cell(8), 0);
        assert_eq!(router.subnet_for_cell(9), 1);
    }

    #[test]
    fn topic_string_matches_the_fixed_format() {
        let router = GossipRouter::new("das", 8);
        assert_eq!(router.topic(3), "/das/das/cell/subnet/3");
    }

    #[test]
    fn registered_node_is_acceptable_for_its_subnets() {
        let router = GossipRouter::new("das", 8);
        router.register_node(node(1), &[2, 5]);
        assert!(router.is_acceptable(&node(1), 2, &[]));
        assert!(!router.is_acceptable(&node(1), 3, &[]));
    }

    #[test]
    fn unregistered_node_is_acceptable_via_on_demand_custody_columns() {
        let router = GossipRouter::new("das", 8);
        // cell index 10 maps to subnet 2
        assert!(router.is_acceptable(&node(9), 2, &[10]));
        assert!(!router.is_acceptable(&node(9), 3, &[10]));
    }

    #[test]
    fn unregister_removes_node_from_every_subnet() {
        let router = GossipRouter::new("das", 8);
        router.register_node(node(1), &[2, 5]);
        router.unregister_node(&node(1));
        assert!(router.subscribers(2).is_empty());
        assert!(router.subscribers(5).is_empty());
    }
}
