//! Bounded TTL cache
//!
//! Every entry carries an absolute expiry. Expired entries are removed by a
//! periodic background sweep (when a tokio runtime is available) and, as a
//! backstop that does not depend on sweep timing, whenever a read finds them.
//!
//! Capacity is a hard bound: inserting a new key into a full cache first drops
//! expired entries, then evicts in insertion order (oldest insert first).
//! Overwriting a key counts as a fresh insert.

use indexmap::IndexMap;
use parking_lot::Mutex;
use std::hash::Hash;
use std::mem::size_of;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Per-entry bookkeeping overhead used by the memory estimate
const ENTRY_OVERHEAD_BYTES: usize = 48;

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CacheStats {
    /// Number of entries currently held (may include not-yet-swept expired ones)
    pub size: usize,
    /// Configured capacity
    pub max_entries: usize,
    /// Reads that returned a live value
    pub hits: u64,
    /// Reads that found nothing or an expired value
    pub misses: u64,
    /// `hits / (hits + misses)`, 0.0 before the first read
    pub hit_rate: f64,
    /// Rough footprint of the entry table in bytes
    pub memory_estimate_bytes: usize,
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    #[inline]
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug)]
struct Shared<K, V> {
    entries: Mutex<IndexMap<K, CacheEntry<V>>>,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    destroyed: AtomicBool,
}

impl<K: Hash + Eq, V> Shared<K, V> {
    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }
}

/// Generic key/value cache with per-entry expiration
///
/// All operations are synchronous and complete under a single lock, so
/// interleaved callers never observe a half-applied update.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    shared: Arc<Shared<K, V>>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Send + 'static,
    V: Clone + Send + 'static,
{
    /// Create a cache holding at most `max_entries`, swept every `sweep_interval`
    ///
    /// The sweep task is only started when called inside a tokio runtime and
    /// `sweep_interval` is non-zero; without it, expiry is still enforced on
    /// read.
    #[must_use]
    pub fn new(max_entries: usize, sweep_interval: Duration) -> Self {
        let shared = Arc::new(Shared {
            entries: Mutex::new(IndexMap::new()),
            max_entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            destroyed: AtomicBool::new(false),
        });

        let sweeper = if sweep_interval.is_zero() {
            None
        } else {
            tokio::runtime::Handle::try_current()
                .ok()
                .map(|handle| handle.spawn(sweep_loop(Arc::downgrade(&shared), sweep_interval)))
        };

        Self {
            shared,
            sweeper: Mutex::new(sweeper),
        }
    }

    /// Get a live value, evicting it if it has expired
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.shared.entries.lock();

        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                self.shared.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.shift_remove(key);
        }
        self.shared.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store `value` until `now + ttl`, replacing any previous entry
    ///
    /// A no-op after [`destroy`](Self::destroy) or when capacity is zero.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        if self.shared.destroyed.load(Ordering::Acquire) || self.shared.max_entries == 0 {
            return;
        }

        let now = Instant::now();
        let expires_at = now.checked_add(ttl).unwrap_or_else(far_future);
        let mut entries = self.shared.entries.lock();

        if entries.shift_remove(&key).is_none() && entries.len() >= self.shared.max_entries {
            entries.retain(|_, entry| !entry.is_expired(now));
            while entries.len() >= self.shared.max_entries {
                if entries.shift_remove_index(0).is_none() {
                    break;
                }
                tracing::trace!(max_entries = self.shared.max_entries, "evicted oldest cache entry");
            }
        }

        entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Remove a single entry
    pub fn remove(&self, key: &K) -> Option<V> {
        self.shared
            .entries
            .lock()
            .shift_remove(key)
            .map(|entry| entry.value)
    }

    /// Check for a live entry without touching hit/miss counters
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        let now = Instant::now();
        self.shared
            .entries
            .lock()
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Drop expired entries now, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        self.shared.purge_expired()
    }

    /// Remove every entry immediately
    pub fn clear(&self) {
        self.shared.entries.lock().clear();
    }

    /// Stop the background sweep and release every entry
    ///
    /// Safe to call any number of times.
    pub fn destroy(&self) {
        self.shared.destroyed.store(true, Ordering::Release);
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
        }
        self.clear();
    }

    /// Whether [`destroy`](Self::destroy) has been called
    #[inline]
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.shared.destroyed.load(Ordering::Acquire)
    }

    /// Current number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.entries.lock().len()
    }

    /// Whether the cache holds no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity
    #[inline]
    #[must_use]
    pub fn max_entries(&self) -> usize {
        self.shared.max_entries
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let size = self.len();
        let hits = self.shared.hits.load(Ordering::Relaxed);
        let misses = self.shared.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;

        CacheStats {
            size,
            max_entries: self.shared.max_entries,
            hits,
            misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
            memory_estimate_bytes: size
                * (size_of::<K>() + size_of::<CacheEntry<V>>() + ENTRY_OVERHEAD_BYTES),
        }
    }
}

impl<K, V> Drop for TtlCache<K, V> {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.abort();
        }
    }
}

async fn sweep_loop<K: Hash + Eq, V>(shared: Weak<Shared<K, V>>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let Some(shared) = shared.upgrade() else {
            break;
        };
        let evicted = shared.purge_expired();
        if evicted > 0 {
            tracing::debug!(evicted, "cache sweep removed expired entries");
        }
    }
}

fn far_future() -> Instant {
    // Roughly thirty years; enough for "never" without overflowing.
    Instant::now() + Duration::from_secs(86_400 * 365 * 30)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NO_SWEEP: Duration = Duration::ZERO;

    #[test]
    fn set_then_get() {
        let cache = TtlCache::new(10, NO_SWEEP);
        cache.set("a", 1, Duration::from_secs(60));
        assert_eq!(cache.get(&"a"), Some(1));
    }

    #[test]
    fn missing_key_is_absent() {
        let cache: TtlCache<&str, u32> = TtlCache::new(10, NO_SWEEP);
        assert_eq!(cache.get(&"missing"), None);
    }

    #[test]
    fn set_overwrites() {
        let cache = TtlCache::new(10, NO_SWEEP);
        cache.set("a", 1, Duration::from_secs(60));
        cache.set("a", 2, Duration::from_secs(60));
        assert_eq!(cache.get(&"a"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_ttl() {
        let cache = TtlCache::new(10, NO_SWEEP);
        cache.set("k", "v", Duration::from_millis(100));

        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(cache.get(&"k"), Some("v"));

        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(cache.get(&"k"), None);
        // Evicted on read
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn background_sweep_evicts_without_reads() {
        let cache = TtlCache::new(10, Duration::from_millis(20));
        cache.set(1, 1, Duration::from_millis(10));
        cache.set(2, 2, Duration::from_secs(60));
        assert_eq!(cache.len(), 2);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&2), Some(2));
    }

    #[test]
    fn capacity_evicts_oldest_insert() {
        let cache = TtlCache::new(3, NO_SWEEP);
        for i in 0..3 {
            cache.set(i, i, Duration::from_secs(60));
        }
        cache.set(3, 3, Duration::from_secs(60));

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(&0), None);
        assert_eq!(cache.get(&3), Some(3));
    }

    #[test]
    fn overwrite_refreshes_insertion_order() {
        let cache = TtlCache::new(2, NO_SWEEP);
        cache.set("a", 1, Duration::from_secs(60));
        cache.set("b", 2, Duration::from_secs(60));
        cache.set("a", 3, Duration::from_secs(60));
        cache.set("c", 4, Duration::from_secs(60));

        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.get(&"a"), Some(3));
        assert_eq!(cache.get(&"c"), Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn full_cache_prefers_dropping_expired_entries() {
        let cache = TtlCache::new(2, NO_SWEEP);
        cache.set("old", 1, Duration::from_secs(60));
        cache.set("short", 2, Duration::from_millis(10));
        tokio::time::advance(Duration::from_millis(20)).await;

        cache.set("new", 3, Duration::from_secs(60));
        assert_eq!(cache.get(&"old"), Some(1));
        assert_eq!(cache.get(&"new"), Some(3));
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let cache = TtlCache::new(0, NO_SWEEP);
        cache.set("a", 1, Duration::from_secs(60));
        assert!(cache.is_empty());
        assert_eq!(cache.get(&"a"), None);
    }

    #[test]
    fn clear_removes_everything() {
        let cache = TtlCache::new(10, NO_SWEEP);
        cache.set("a", 1, Duration::from_secs(60));
        cache.set("b", 2, Duration::from_secs(60));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn destroy_is_idempotent_and_disables_writes() {
        let cache = TtlCache::new(10, Duration::from_millis(5));
        cache.set("a", 1, Duration::from_secs(60));

        cache.destroy();
        cache.destroy();

        assert!(cache.is_destroyed());
        assert!(cache.is_empty());
        cache.set("b", 2, Duration::from_secs(60));
        assert_eq!(cache.get(&"b"), None);
    }

    #[test]
    fn stats_track_hits_and_misses() {
        let cache = TtlCache::new(10, NO_SWEEP);
        cache.set("a", 1u64, Duration::from_secs(60));
        let _ = cache.get(&"a");
        let _ = cache.get(&"a");
        let _ = cache.get(&"b");

        let stats = cache.stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 2.0 / 3.0).abs() < f64::EPSILON);
        assert!(stats.memory_estimate_bytes > 0);
    }

    #[test]
    fn contains_key_does_not_count_lookups() {
        let cache = TtlCache::new(10, NO_SWEEP);
        cache.set("a", 1, Duration::from_secs(60));
        assert!(cache.contains_key(&"a"));
        assert!(!cache.contains_key(&"b"));
        assert_eq!(cache.stats().hits + cache.stats().misses, 0);
    }

    proptest! {
        #[test]
        fn size_never_exceeds_capacity(max in 1usize..32, keys in proptest::collection::vec(0u16..64, 0..200)) {
            let cache = TtlCache::new(max, NO_SWEEP);
            for key in keys {
                cache.set(key, key, Duration::from_secs(60));
                prop_assert!(cache.len() <= max);
            }
        }
    }
}
