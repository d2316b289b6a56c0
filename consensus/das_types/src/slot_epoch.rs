use std::fmt;
use std::ops::{Add, Sub};

/// A consensus slot number, monotonically increasing, supplied by the external slot clock (see
/// `slot_clock`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot(u64);

/// A consensus epoch number; `Epoch = Slot / SlotsPerEpoch`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Epoch(u64);

use serde::{Deserialize, Serialize};

impl Slot {
    pub const fn new(slot: u64) -> Self {
        Self(slot)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    pub fn epoch(self, slots_per_epoch: u64) -> Epoch {
        Epoch::new(self.0 / slots_per_epoch)
    }
}

impl Epoch {
    pub const fn new(epoch: u64) -> Self {
        Self(epoch)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    pub fn start_slot(self, slots_per_epoch: u64) -> Slot {
        Slot::new(self.0 * slots_per_epoch)
    }
}

impl Add<u64> for Slot {
    type Output = Slot;
    fn add(self, rhs: u64) -> Slot {
        Slot(self.0 + rhs)
    }
}

impl Sub<u64> for Slot {
    type Output = Slot;
    fn sub(self, rhs: u64) -> Slot {
        Slot(self.0.saturating_sub(rhs))
    }
}

impl Add<u64> for Epoch {
    type Output = Epoch;
    fn add(self, rhs: u64) -> Epoch {
        Epoch(self.0 + rhs)
    }
}

impl Sub<u64> for Epoch {
    type Output = Epoch;
    fn sub(self, rhs: u64) -> Epoch {
        Epoch(self.0.saturating_sub(rhs))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Slot {
    fn from(v: u64) -> Self {
        Slot(v)
    }
}

impl From<u64> for Epoch {
    fn from(v: u64) -> Self {
        Epoch(v)
    }
}
