use fnv::FnvHashMap;
use std::collections::VecDeque;
use std::hash::Hash;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Capacity- and TTL-bounded cache with LRU eviction, grounded on the validation cache described
/// in the blob/cell validator design: on lookup, expired entries are treated as a miss and
/// removed; on insert, the oldest entry is evicted once capacity is exceeded.
pub struct TtlLruCache<K, V> {
    capacity: usize,
    ttl: Duration,
    map: FnvHashMap<K, Entry<V>>,
    order: VecDeque<K>,
    hits: u64,
    misses: u64,
}

impl<K, V> TtlLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            map: FnvHashMap::default(),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        let expired = match self.map.get(key) {
            Some(entry) => entry.inserted_at.elapsed() > self.ttl,
            None => {
                self.misses += 1;
                return None;
            }
        };

        if expired {
            self.remove(key);
            self.misses += 1;
            return None;
        }

        self.hits += 1;
        self.touch(key);
        self.map.get(key).map(|e| &e.value)
    }

    pub fn insert(&mut self, key: K, value: V) {
        if self.map.contains_key(&key) {
            self.remove(&key);
        }

        while self.map.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.map.remove(&oldest);
            } else {
                break;
            }
        }

        self.map.insert(
            key.clone(),
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
        self.order.push_back(key);
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
        self.map.remove(key).map(|e| e.value)
    }

    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn insert_and_get_round_trips() {
        let mut cache: TtlLruCache<u64, &str> = TtlLruCache::new(4, Duration::from_secs(60));
        cache.insert(1, "a");
        assert_eq!(cache.get(&1), Some(&"a"));
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 0);
    }

    #[test]
    fn miss_on_unknown_key() {
        let mut cache: TtlLruCache<u64, &str> = TtlLruCache::new(4, Duration::from_secs(60));
        assert_eq!(cache.get(&99), None);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn evicts_oldest_when_capacity_exceeded() {
        let mut cache: TtlLruCache<u64, u64> = TtlLruCache::new(2, Duration::from_secs(60));
        cache.insert(1, 100);
        cache.insert(2, 200);
        cache.insert(3, 300);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(&200));
        assert_eq!(cache.get(&3), Some(&300));
    }

    #[test]
    fn expired_entries_are_treated_as_miss_and_removed() {
        let mut cache: TtlLruCache<u64, u64> = TtlLruCache::new(4, Duration::from_millis(10));
        cache.insert(1, 100);
        sleep(Duration::from_millis(25));
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn touching_an_entry_protects_it_from_eviction() {
        let mut cache: TtlLruCache<u64, u64> = TtlLruCache::new(2, Duration::from_secs(60));
        cache.insert(1, 100);
        cache.insert(2, 200);
        // Touch 1 so it becomes most-recently-used.
        assert_eq!(cache.get(&1), Some(&100));
        cache.insert(3, 300);
        assert_eq!(cache.get(&2), None, "2 should be evicted as least-recently-used");
        assert_eq!(cache.get(&1), Some(&100));
        assert_eq!(cache.get(&3), Some(&300));
    }
}
