use crate::validator::ValidationResult;
use lru_cache::TtlLruCache;
use std::time::Duration;
use types::Commitment;

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

/// Caches validation results keyed by commitment, so a column/sample seen again within the TTL
/// skips re-running the rule chain.
pub struct ValidationCache {
    inner: TtlLruCache<[u8; 32], ValidationResult>,
}

impl ValidationCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: TtlLruCache::new(capacity, ttl),
        }
    }

    pub fn get(&mut self, commitment: &Commitment) -> Option<ValidationResult> {
        self.inner.get(&commitment.0).cloned()
    }

    pub fn insert(&mut self, commitment: Commitment, result: ValidationResult) {
        self.inner.insert(commitment.0, result);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.inner.hits(),
            misses: self.inner.misses(),
            size: self.inner.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(valid: bool) -> ValidationResult {
        ValidationResult { valid, errors: Vec::new() }
    }

    #[test]
    fn insert_then_get_hits_cache() {
        let mut cache = ValidationCache::new(4, Duration::from_secs(60));
        let commitment = Commitment([7u8; 32]);
        cache.insert(commitment, result(true));
        assert_eq!(cache.get(&commitment), Some(result(true)));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn miss_on_unknown_commitment_is_counted() {
        let mut cache = ValidationCache::new(4, Duration::from_secs(60));
        assert_eq!(cache.get(&Commitment([1u8; 32])), None);
        assert_eq!(cache.stats().misses, 1);
    }
}
