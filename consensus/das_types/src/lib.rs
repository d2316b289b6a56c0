pub mod cell;
pub mod consts;
pub mod primitives;
pub mod slot_epoch;

pub use cell::{
    Cell, Column, ColumnAvailability, CustodyEpochState, Reservation, Sample, SlotSamplingStatus,
    SlotVerdict, SubnetAssignment,
};
pub use consts::DasSpec;
pub use primitives::{
    BlobIndex, CellIndex, Commitment, ColumnIndex, CustodyIndex, NodeId, PeerId, SubnetId,
};
pub use slot_epoch::{Epoch, Slot};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_spec_matches_named_constants() {
        let spec = DasSpec::mainnet();
        assert_eq!(spec.number_of_columns, 128);
        assert_eq!(spec.reconstruction_threshold, 64);
        assert_eq!(spec.samples_per_slot, 8);
        assert_eq!(spec.custody_requirement, 4);
        assert_eq!(spec.bytes_per_blob(), 4096 * 32);
    }

    #[test]
    fn subnet_for_column_wraps() {
        let spec = DasSpec::minimal();
        assert_eq!(spec.subnet_for_column(0), 0);
        assert_eq!(
            spec.subnet_for_column(spec.data_column_sidecar_subnet_count),
            0
        );
    }

    #[test]
    fn slot_epoch_arithmetic() {
        let spec = DasSpec::minimal();
        let slot = Slot::new(17);
        let epoch = slot.epoch(spec.slots_per_epoch);
        assert_eq!(epoch, Epoch::new(17 / spec.slots_per_epoch));
        assert_eq!(epoch.start_slot(spec.slots_per_epoch) <= slot, true);
    }

    #[test]
    fn reservation_consumes_exactly_once() {
        let now = std::time::Instant::now();
        let deadline = now + std::time::Duration::from_secs(1);
        let mut r = Reservation::new(1024, deadline, "peer-a".to_string());
        assert!(r.consume(now));
        assert!(!r.consume(now));
    }

    #[test]
    fn reservation_expired_never_consumes() {
        let now = std::time::Instant::now();
        let deadline = now;
        let mut r = Reservation::new(1024, deadline, "peer-a".to_string());
        let later = now + std::time::Duration::from_millis(1);
        assert!(!r.consume(later));
    }

    #[test]
    fn column_availability_score_and_available() {
        let mut avail = ColumnAvailability {
            slot: Slot::new(0),
            required_columns: vec![0, 1, 2, 3],
            downloaded_columns: vec![0, 1, 2],
            verified_columns: vec![0, 1],
            ..Default::default()
        };
        assert_eq!(avail.score(), 0.5);
        assert!(!avail.available());
        avail.verified_columns = vec![0, 1, 2, 3];
        assert!(avail.available());
    }
}
