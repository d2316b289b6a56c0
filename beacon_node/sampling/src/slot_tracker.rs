use das_crypto::column_proof;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use types::{ColumnAvailability, ColumnIndex, Slot};

#[derive(Debug, Clone)]
pub struct SampleLogEntry {
    pub column: ColumnIndex,
    pub verified: bool,
}

struct SlotState {
    required: Vec<ColumnIndex>,
    downloaded: HashSet<ColumnIndex>,
    verified: HashSet<ColumnIndex>,
    samples: Vec<SampleLogEntry>,
}

/// Per-slot sampling tracker (§4.4): tracks required/downloaded/verified column sets and an
/// append-only samples log, with slot-window eviction.
pub struct SlotSamplingTracker {
    track_slots: u64,
    states: RwLock<BTreeMap<u64, SlotState>>,
}

impl SlotSamplingTracker {
    pub fn new(track_slots: u64) -> Self {
        Self {
            track_slots,
            states: RwLock::new(BTreeMap::new()),
        }
    }

    /// Registers the required columns for `slot`. Idempotent: re-initializing an existing slot
    /// replaces its required set but keeps any downloaded/verified progress already recorded.
    pub fn init_slot(&self, slot: Slot, required: Vec<ColumnIndex>) {
        let mut states = self.states.write();
        states
            .entry(slot.as_u64())
            .or_insert_with(|| SlotState {
                required: required.clone(),
                downloaded: HashSet::new(),
                verified: HashSet::new(),
                samples: Vec::new(),
            })
            .required = required;

        self.evict_outside_window(&mut states, slot.as_u64());
    }

    fn evict_outside_window(&self, states: &mut BTreeMap<u64, SlotState>, current_slot: u64) {
        let floor = current_slot.saturating_sub(self.track_slots);
        while states.len() as u64 > self.track_slots {
            let Some(&oldest) = states.keys().next() else {
                break;
            };
            if oldest < floor {
                states.remove(&oldest);
            } else {
                break;
            }
        }
    }

    /// Recomputes `H(slotLE || colLE || data)` and compares to `expected_root`; on a match marks
    /// the column verified *and* downloaded, and appends a log entry either way.
    pub fn verify_sample(&self, slot: Slot, col: ColumnIndex, data: &[u8], expected_root: &[u8; 32]) -> bool {
        let computed = column_proof(slot.as_u64(), col, data);
        let ok = &computed == expected_root;

        let mut states = self.states.write();
        let state = states.entry(slot.as_u64()).or_insert_with(|| SlotState {
            required: Vec::new(),
            downloaded: HashSet::new(),
            verified: HashSet::new(),
            samples: Vec::new(),
        });

        if ok {
            state.downloaded.insert(col);
            state.verified.insert(col);
        }
        state.samples.push(SampleLogEntry { column: col, verified: ok });

        ok
    }

    pub fn get_availability(&self, slot: Slot) -> ColumnAvailability {
        let states = self.states.read();
        match states.get(&slot.as_u64()) {
            Some(state) => ColumnAvailability {
                slot,
                required_columns: state.required.clone(),
                downloaded_columns: state.downloaded.iter().copied().collect(),
                verified_columns: state.verified.iter().copied().collect(),
            },
            None => ColumnAvailability {
                slot,
                ..Default::default()
            },
        }
    }

    /// Drops all entries for slots earlier than `slot`.
    pub fn prune_before(&self, slot: Slot) {
        let mut states = self.states.write();
        states.retain(|&s, _| s >= slot.as_u64());
    }

    pub fn tracked_slot_count(&self) -> usize {
        self.states.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_sample_marks_verified_and_downloaded_on_match() {
        let tracker = SlotSamplingTracker::new(100);
        let slot = Slot::new(5);
        tracker.init_slot(slot, vec![0, 1, 2]);
        let data = b"cell-data";
        let expected = column_proof(slot.as_u64(), 1, data);
        assert!(tracker.verify_sample(slot, 1, data, &expected));

        let avail = tracker.get_availability(slot);
        assert!(avail.downloaded_columns.contains(&1));
        assert!(avail.verified_columns.contains(&1));
    }

    #[test]
    fn verify_sample_rejects_mismatched_root() {
        let tracker = SlotSamplingTracker::new(100);
        let slot = Slot::new(5);
        tracker.init_slot(slot, vec![0]);
        let bogus = [0u8; 32];
        assert!(!tracker.verify_sample(slot, 0, b"data", &bogus));
        let avail = tracker.get_availability(slot);
        assert!(!avail.verified_columns.contains(&0));
    }

    #[test]
    fn availability_score_and_available_flag() {
        let tracker = SlotSamplingTracker::new(100);
        let slot = Slot::new(5);
        tracker.init_slot(slot, vec![0, 1]);
        let data = b"payload";
        let root0 = column_proof(slot.as_u64(), 0, data);
        let root1 = column_proof(slot.as_u64(), 1, data);
        tracker.verify_sample(slot, 0, data, &root0);
        assert!(!tracker.get_availability(slot).available());
        tracker.verify_sample(slot, 1, data, &root1);
        assert!(tracker.get_availability(slot).available());
    }

    #[test]
    fn prune_before_drops_earlier_slots() {
        let tracker = SlotSamplingTracker::new(100);
        tracker.init_slot(Slot::new(1), vec![0]);
        tracker.init_slot(Slot::new(2), vec![0]);
        tracker.prune_before(Slot::new(2));
        assert_eq!(tracker.tracked_slot_count(), 1);
    }

    #[test]
    fn eviction_runs_when_tracked_slots_exceeds_window() {
        let tracker = SlotSamplingTracker::new(2);
        for slot in 1..=5u64 {
            tracker.init_slot(Slot::new(slot), vec![0]);
        }
        assert!(tracker.tracked_slot_count() as u64 <= 2);
    }
}
