use serde::{Deserialize, Serialize};
use std::fmt;

pub type ColumnIndex = u64;
pub type BlobIndex = u64;
pub type CellIndex = u64;
pub type SubnetId = u64;
pub type CustodyIndex = u64;

/// 32-byte node identity. Used both as peer identity and as the seed for custody/sampling
/// derivation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub [u8; 32]);

impl NodeId {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId(0x{})", hex::encode(self.0))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// 32-byte opaque commitment digest. Stands in for a real KZG commitment (see §1 of the spec).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Commitment(pub [u8; 32]);

impl Commitment {
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment(0x{})", hex::encode(self.0))
    }
}

/// A peer identity as seen by the network layer. Distinct from `NodeId` because peers are
/// addressed by a string-like handle at the P2P layer, while `NodeId` is the 32-byte value
/// custody/sampling derivation is keyed on.
pub type PeerId = String;
