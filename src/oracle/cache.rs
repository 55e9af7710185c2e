use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use crate::data::Award;
use crate::oracle::{Neighbor, OracleOutcome, SimilarityOracle};

/// Cache key: query text, label filter, and requested neighbor count.
type QueryKey = (String, Award, usize);

/// Counters reported by `QueryCache::stats`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that fell through to the oracle.
    pub misses: u64,
    /// Entries dropped to stay within capacity.
    pub evictions: u64,
    /// Entries currently held.
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups served from cache (0.0 when nothing was looked up).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Thread-safe bounded LRU of oracle hits.
///
/// Clones share the same storage, so one cache can back several samplers.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Mutex<QueryCacheInner>>,
}

/// Internal mutable cache storage behind the `QueryCache` lock.
struct QueryCacheInner {
    /// `None` when the cache was created with capacity 0.
    entries: Option<LruCache<QueryKey, Vec<Neighbor>>>,
    capacity: usize,
    stats: CacheStats,
}

impl QueryCache {
    /// Create a cache holding at most `capacity` queries. Capacity 0 stores nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(QueryCacheInner {
                entries: NonZeroUsize::new(capacity).map(LruCache::new),
                capacity,
                stats: CacheStats::default(),
            })),
        }
    }

    /// Look up cached hits, marking the entry most recently used.
    pub fn get(&self, text: &str, label: Award, k: usize) -> Option<Vec<Neighbor>> {
        let mut guard = self.inner.lock().expect("query cache poisoned");
        let inner = &mut *guard;
        let key = (text.to_string(), label, k);
        let found = inner
            .entries
            .as_mut()
            .and_then(|entries| entries.get(&key).cloned());
        if found.is_some() {
            inner.stats.hits += 1;
        } else {
            inner.stats.misses += 1;
        }
        found
    }

    /// Insert or refresh an entry, evicting the least recently used entry when full.
    pub fn insert(&self, text: &str, label: Award, k: usize, neighbors: Vec<Neighbor>) {
        let mut guard = self.inner.lock().expect("query cache poisoned");
        let inner = &mut *guard;
        let Some(entries) = inner.entries.as_mut() else {
            return;
        };
        let key = (text.to_string(), label, k);
        if entries.contains(&key) {
            entries.put(key, neighbors);
        } else if entries.push(key, neighbors).is_some() {
            inner.stats.evictions += 1;
        }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.inner.lock().expect("query cache poisoned").capacity
    }

    /// Entries currently held.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("query cache poisoned")
            .entries
            .as_ref()
            .map_or(0, LruCache::len)
    }

    /// True when no entries are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of hit/miss/eviction counters and current size.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().expect("query cache poisoned");
        CacheStats {
            entries: inner.entries.as_ref().map_or(0, LruCache::len),
            ..inner.stats
        }
    }

    /// Drop all entries; counters are kept.
    pub fn clear(&self) {
        if let Some(entries) = self
            .inner
            .lock()
            .expect("query cache poisoned")
            .entries
            .as_mut()
        {
            entries.clear();
        }
    }
}

/// Read-through caching wrapper around any oracle.
///
/// Only `Found` outcomes are cached; an unavailable oracle is asked again on
/// the next lookup.
pub struct CachedOracle<O> {
    inner: O,
    cache: QueryCache,
}

impl<O: SimilarityOracle> CachedOracle<O> {
    /// Wrap `inner`, answering repeated queries from `cache`.
    pub fn new(inner: O, cache: QueryCache) -> Self {
        Self { inner, cache }
    }

    /// Shared handle to the backing cache.
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Wrapped oracle.
    pub fn inner(&self) -> &O {
        &self.inner
    }
}

impl<O: SimilarityOracle> SimilarityOracle for CachedOracle<O> {
    fn query(&self, text: &str, k: usize, label: Award) -> OracleOutcome {
        if self.cache.capacity() == 0 {
            return self.inner.query(text, k, label);
        }
        if let Some(neighbors) = self.cache.get(text, label, k) {
            return OracleOutcome::Found(neighbors);
        }
        let outcome = self.inner.query(text, k, label);
        if let OracleOutcome::Found(neighbors) = &outcome {
            self.cache.insert(text, label, k, neighbors.clone());
        }
        outcome
    }
}
