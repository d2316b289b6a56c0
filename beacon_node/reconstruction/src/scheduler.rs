use crate::collector::CellCollector;
use types::BlobIndex;

/// A `(slot, blob)` ready for (or progressing towards) reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub slot: u64,
    pub blob: BlobIndex,
    pub priority: u8,
    pub readiness: f64,
}

/// Scans the collector for blobs with `cellCount >= threshold` that are neither reconstructed
/// nor errored, sorted by priority descending then readiness fraction descending (§4.5).
pub fn schedule(collector: &CellCollector, threshold: usize) -> Vec<ScheduleEntry> {
    use types::Slot;

    let mut entries: Vec<ScheduleEntry> = collector
        .tracked_keys()
        .into_iter()
        .filter_map(|(slot, blob)| {
            let slot = Slot::new(slot);
            if collector.is_reconstructed(slot, blob) || collector.is_errored(slot, blob) {
                return None;
            }
            if collector.cell_count(slot, blob) < threshold {
                return None;
            }
            let priority = match collector.priority(slot, blob)? {
                crate::collector::Priority::High => 2,
                crate::collector::Priority::Normal => 1,
                crate::collector::Priority::Low => 0,
            };
            Some(ScheduleEntry {
                slot: slot.as_u64(),
                blob,
                priority,
                readiness: collector.readiness(slot, blob, threshold),
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(b.readiness.partial_cmp(&a.readiness).unwrap_or(std::cmp::Ordering::Equal))
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::Priority;
    use types::{Commitment, Slot};

    #[test]
    fn schedule_sorts_by_priority_then_readiness() {
        let collector = CellCollector::new();
        collector.init_blob(Slot::new(1), 0, Priority::Low, Commitment::zero());
        collector.init_blob(Slot::new(1), 1, Priority::High, Commitment::zero());
        collector.init_blob(Slot::new(1), 2, Priority::Normal, Commitment::zero());
        for blob in 0..3u64 {
            for col in 0..4u64 {
                collector.add_cell(Slot::new(1), blob, col, vec![0]).unwrap();
            }
        }
        let entries = schedule(&collector, 4);
        assert_eq!(entries[0].blob, 1); // High
        assert_eq!(entries[1].blob, 2); // Normal
        assert_eq!(entries[2].blob, 0); // Low
    }

    #[test]
    fn schedule_excludes_below_threshold_reconstructed_and_errored() {
        let collector = CellCollector::new();
        collector.init_blob(Slot::new(1), 0, Priority::Normal, Commitment::zero());
        collector.add_cell(Slot::new(1), 0, 0, vec![0]).unwrap();
        assert!(schedule(&collector, 4).is_empty());

        collector.init_blob(Slot::new(1), 1, Priority::Normal, Commitment::zero());
        for col in 0..4u64 {
            collector.add_cell(Slot::new(1), 1, col, vec![0]).unwrap();
        }
        collector.mark_reconstructed(Slot::new(1), 1, vec![]);
        assert!(schedule(&collector, 4).iter().all(|e| e.blob != 1));
    }
}
