//! Typed stage cache
//!
//! One shared `TtlCache` holds every stage's outputs. Values are stored
//! type-erased and downcast on read, so a key that somehow maps to a value of
//! the wrong type reads as a miss rather than an error.

use intentflow_cache::{generate_key, CacheKey, CacheStats, TtlCache};
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

type Erased = Arc<dyn Any + Send + Sync>;

/// Cache of stage outputs keyed by `(category, input)` fingerprints
#[derive(Debug)]
pub struct StageCache {
    inner: TtlCache<CacheKey, Erased>,
}

impl StageCache {
    /// Create cache with capacity and sweep period
    #[inline]
    #[must_use]
    pub fn new(max_entries: usize, sweep_interval: Duration) -> Self {
        Self {
            inner: TtlCache::new(max_entries, sweep_interval),
        }
    }

    /// Fingerprint `input` under `category`
    ///
    /// Returns `None` if the input cannot be fingerprinted; callers treat
    /// that as "uncacheable" and run the stage directly.
    #[must_use]
    pub fn key<T: Serialize + ?Sized>(category: &str, input: &T) -> Option<CacheKey> {
        match generate_key(category, input) {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::debug!(category, error = %e, "cache key derivation failed");
                None
            }
        }
    }

    /// Get a cached value of type `T`
    #[must_use]
    pub fn get<T: Clone + 'static>(&self, key: &CacheKey) -> Option<T> {
        self.inner
            .get(key)
            .and_then(|erased| erased.downcast_ref::<T>().cloned())
    }

    /// Insert a value with its own lifetime
    pub fn insert<T: Send + Sync + 'static>(&self, key: CacheKey, value: T, ttl: Duration) {
        self.inner.set(key, Arc::new(value), ttl);
    }

    /// Get cache statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }

    /// Drop every entry
    #[inline]
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Stop sweeping and drop every entry; later inserts are ignored
    #[inline]
    pub fn destroy(&self) {
        self.inner.destroy();
    }

    /// Whether `destroy` has been called
    #[inline]
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.inner.is_destroyed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn typed_round_trip() {
        let cache = StageCache::new(10, Duration::ZERO);
        let key = StageCache::key("roi-analysis", &("ops", 3)).unwrap();

        cache.insert(key.clone(), vec![1u32, 2, 3], Duration::from_secs(60));
        assert_eq!(cache.get::<Vec<u32>>(&key), Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn wrong_type_reads_as_miss() {
        let cache = StageCache::new(10, Duration::ZERO);
        let key = StageCache::key("intent-parsing", "hello").unwrap();

        cache.insert(key.clone(), 42u64, Duration::from_secs(60));
        assert_eq!(cache.get::<String>(&key), None);
        assert_eq!(cache.stats().size, 1);
    }

    #[test]
    fn invalid_category_is_uncacheable() {
        assert!(StageCache::key("bad:category", "x").is_none());
    }

    #[tokio::test]
    async fn destroy_disables_inserts() {
        let cache = StageCache::new(10, Duration::from_secs(1));
        let key = StageCache::key("spec-generation", "x").unwrap();

        cache.destroy();
        cache.destroy();
        cache.insert(key.clone(), 1u8, Duration::from_secs(60));

        assert!(cache.is_destroyed());
        assert_eq!(cache.get::<u8>(&key), None);
        assert_eq!(cache.stats().size, 0);
    }
}
