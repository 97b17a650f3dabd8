//! Session-scoped memoization for data-fetching helpers.
//!
//! A [`SessionCache`] is owned by one analysis session (typically a
//! notebooklet instance) and keyed by a hashable request descriptor.
//! Entries are never invalidated automatically; callers reset explicitly
//! when the underlying data may have changed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Hit/miss counters for a cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
}

impl CacheMetrics {
    /// Hit rate as a fraction (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// An explicit memoization cache keyed by request descriptors.
#[derive(Debug, Clone)]
pub struct SessionCache<K, V> {
    entries: HashMap<K, V>,
    metrics: CacheMetrics,
}

impl<K, V> Default for SessionCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            metrics: CacheMetrics::default(),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> SessionCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached value, counting the hit or miss.
    pub fn get(&mut self, key: &K) -> Option<V> {
        match self.entries.get(key) {
            Some(value) => {
                self.metrics.hits += 1;
                Some(value.clone())
            }
            None => {
                self.metrics.misses += 1;
                None
            }
        }
    }

    /// Return the cached value for `key`, or compute it with `fetch` and
    /// cache it. A failed fetch caches nothing.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: K,
        fetch: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = fetch()?;
        self.entries.insert(key, value.clone());
        Ok(value)
    }

    /// Drop one entry. Returns whether it was present.
    pub fn invalidate(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop all entries and reset the metrics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.metrics = CacheMetrics::default();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_once_then_hit() {
        let mut cache: SessionCache<String, u32> = SessionCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            let value = cache
                .get_or_try_insert_with::<()>("k".to_string(), || {
                    calls += 1;
                    Ok(42)
                })
                .unwrap();
            assert_eq!(value, 42);
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.metrics().hits, 2);
        assert_eq!(cache.metrics().misses, 1);
    }

    #[test]
    fn test_failed_fetch_not_cached() {
        let mut cache: SessionCache<u32, u32> = SessionCache::new();
        let result: Result<u32, &str> = cache.get_or_try_insert_with(1, || Err("boom"));
        assert!(result.is_err());
        assert!(cache.is_empty());

        let value = cache.get_or_try_insert_with::<&str>(1, || Ok(7)).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_invalidate() {
        let mut cache: SessionCache<u32, u32> = SessionCache::new();
        cache.get_or_try_insert_with::<()>(1, || Ok(10)).unwrap();
        assert!(cache.invalidate(&1));
        assert!(!cache.invalidate(&1));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_resets_metrics() {
        let mut cache: SessionCache<u32, u32> = SessionCache::new();
        cache.get_or_try_insert_with::<()>(1, || Ok(10)).unwrap();
        cache.get(&1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.metrics(), &CacheMetrics::default());
    }

    #[test]
    fn test_hit_rate() {
        let mut cache: SessionCache<u32, u32> = SessionCache::new();
        cache.get_or_try_insert_with::<()>(1, || Ok(1)).unwrap();
        cache.get(&1);
        cache.get(&1);
        assert!((cache.metrics().hit_rate() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(CacheMetrics::default().hit_rate(), 0.0);
    }
}
