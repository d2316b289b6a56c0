use crate::errors::BandwidthError;
use crate::token_bucket::TokenBucket;
use parking_lot::RwLock;
use std::collections::HashMap;

pub type ChainId = u64;

/// Per-L2-chain bandwidth enforcer with a global cap, congestion pricing, and backpressure
/// (§4.2, "a separate bandwidth enforcer"). Distinct from `BandwidthController`: keyed by chain
/// rather than peer, and surcharges requests instead of rejecting them outright below the
/// backpressure threshold.
pub struct BandwidthEnforcer {
    global: RwLock<TokenBucket>,
    chains: RwLock<HashMap<ChainId, TokenBucket>>,
    max_chains: usize,
    per_chain_bps: f64,
    congestion_threshold: f64,
    backpressure_threshold: f64,
    congestion_multiplier: f64,
}

impl BandwidthEnforcer {
    pub fn new(
        max_global_bps: f64,
        per_chain_bps: f64,
        max_chains: usize,
        congestion_threshold: f64,
        backpressure_threshold: f64,
        congestion_multiplier: f64,
    ) -> Result<Self, BandwidthError> {
        let global = TokenBucket::new(max_global_bps, max_global_bps)?;
        Ok(Self {
            global: RwLock::new(global),
            chains: RwLock::new(HashMap::new()),
            max_chains,
            per_chain_bps,
            congestion_threshold,
            backpressure_threshold,
            congestion_multiplier,
        })
    }

    pub fn allocate(&self, chain_id: ChainId, size: u64) -> Result<(), BandwidthError> {
        let global_utilization = self.global.write().utilization();
        if global_utilization >= self.backpressure_threshold {
            return Err(BandwidthError::Backpressure);
        }

        let effective_size = if global_utilization >= self.congestion_threshold {
            size as f64 * self.congestion_multiplier
        } else {
            size as f64
        };

        let chain_ok = {
            let mut chains = self.chains.write();
            if !chains.contains_key(&chain_id) && chains.len() >= self.max_chains {
                return Err(BandwidthError::MaxChainsReached);
            }
            let bucket = chains.entry(chain_id).or_insert_with(|| {
                TokenBucket::new(self.per_chain_bps, self.per_chain_bps)
                    .expect("per_chain_bps validated at enforcer construction")
            });
            bucket.allocate(effective_size).0
        };
        if !chain_ok {
            return Err(BandwidthError::InsufficientBandwidth);
        }

        let (global_ok, _) = self.global.write().allocate(effective_size);
        if !global_ok {
            let mut chains = self.chains.write();
            if let Some(bucket) = chains.get_mut(&chain_id) {
                bucket.refund(effective_size);
            }
            return Err(BandwidthError::InsufficientBandwidth);
        }

        Ok(())
    }

    pub fn tracked_chain_count(&self) -> usize {
        self.chains.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_within_per_chain_and_global_caps() {
        let enforcer = BandwidthEnforcer::new(10_000.0, 1_000.0, 4, 0.8, 0.95, 2.0).unwrap();
        assert!(enforcer.allocate(1, 500).is_ok());
    }

    #[test]
    fn rejects_new_chain_beyond_max_chains() {
        let enforcer = BandwidthEnforcer::new(10_000.0, 1_000.0, 1, 0.8, 0.95, 2.0).unwrap();
        enforcer.allocate(1, 10).unwrap();
        assert_eq!(enforcer.allocate(2, 10).unwrap_err(), BandwidthError::MaxChainsReached);
    }

    #[test]
    fn backpressure_denies_once_global_utilization_crosses_threshold() {
        let enforcer = BandwidthEnforcer::new(100.0, 1000.0, 4, 0.5, 0.6, 2.0).unwrap();
        // Drive the global bucket past the backpressure threshold directly.
        enforcer.global.write().allocate(61.0);
        assert_eq!(enforcer.allocate(1, 1).unwrap_err(), BandwidthError::Backpressure);
    }

    #[test]
    fn chain_bucket_is_refunded_on_global_denial() {
        let enforcer = BandwidthEnforcer::new(10.0, 1000.0, 4, 0.8, 0.95, 1.0).unwrap();
        // Global bucket capacity is tiny (10) relative to chain capacity (1000): the chain
        // debit succeeds but the global debit fails, and the chain should be refunded in full.
        let result = enforcer.allocate(1, 500);
        assert_eq!(result.unwrap_err(), BandwidthError::InsufficientBandwidth);
        let mut chains = enforcer.chains.write();
        let bucket = chains.get_mut(&1).unwrap();
        assert!((bucket.available() - 1000.0).abs() < 1.0);
    }
}
