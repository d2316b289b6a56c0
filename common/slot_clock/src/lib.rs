use std::time::Duration;
use types::Slot;

mod manual_slot_clock;
mod system_time_slot_clock;

pub use manual_slot_clock::ManualSlotClock;
pub use system_time_slot_clock::SystemTimeSlotClock;

/// External slot/epoch clock collaborator (§6). Every DAS subsystem that needs "what slot/epoch
/// is it" goes through an implementor of this trait rather than reading the system clock
/// directly, so tests can drive time deterministically via `ManualSlotClock`.
pub trait SlotClock: Send + Sync + Sized + Clone {
    fn new(genesis_slot: Slot, genesis_duration: Duration, slot_duration: Duration) -> Self;

    /// Returns the current slot, or `None` if the clock is prior to genesis.
    fn now(&self) -> Option<Slot>;

    fn is_prior_to_genesis(&self) -> Option<bool>;

    fn now_duration(&self) -> Option<Duration>;

    fn slot_of(&self, now: Duration) -> Option<Slot>;

    fn duration_to_next_slot(&self) -> Option<Duration>;

    fn duration_to_next_epoch(&self, slots_per_epoch: u64) -> Option<Duration>;

    fn slot_duration(&self) -> Duration;

    fn duration_to_slot(&self, slot: Slot) -> Option<Duration>;

    /// Returns the duration between UNIX epoch and the start of `slot`.
    fn start_of(&self, slot: Slot) -> Option<Duration>;

    fn genesis_slot(&self) -> Slot;

    fn genesis_duration(&self) -> Duration;

    /// Returns the current slot, allowing `tolerance` of additional leeway into the future —
    /// i.e. a slot that hasn't technically started yet, but is within `tolerance` of starting,
    /// is treated as current. Mirrors clock-skew tolerance used by gossip validation.
    fn now_with_future_tolerance(&self, tolerance: Duration) -> Option<Slot> {
        self.slot_of(self.now_duration()?.checked_add(tolerance)?)
    }

    /// As `now_with_future_tolerance`, but tolerant of the clock being slightly behind.
    fn now_with_past_tolerance(&self, tolerance: Duration) -> Option<Slot> {
        let now = self.now_duration()?;
        let adjusted = now.checked_sub(tolerance).unwrap_or_default();
        self.slot_of(adjusted).or_else(|| self.slot_of(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_with_tolerance_matches_manual_clock() {
        let clock = ManualSlotClock::new(Slot::new(0), Duration::from_secs(10), Duration::from_secs(1));
        clock.set_current_time(Duration::from_secs(10));
        assert_eq!(
            clock.now_with_future_tolerance(Duration::from_secs(0)),
            Some(Slot::new(0))
        );
        assert_eq!(
            clock.now_with_past_tolerance(Duration::from_secs(0)),
            Some(Slot::new(0))
        );
    }
}
