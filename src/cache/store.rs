//! LRU Store Module
//!
//! Byte-bounded key/value storage combining a HashMap with LRU tracking.

use std::collections::HashMap;
use std::fmt;

use crate::cache::{ByteSize, CacheStats, LruTracker};

/// Callback run for every entry evicted from an [`LruStore`].
pub type EvictHook<V> = Box<dyn FnMut(&str, &V) + Send>;

// == LRU Store ==
/// Fixed-capacity store that evicts least recently used entries.
///
/// An entry's size is its key length plus the value's [`ByteSize`]. The
/// resident total never exceeds `max_bytes` after an `add` returns; a
/// `max_bytes` of zero disables eviction. Not thread-safe on its own, see
/// [`SharedCache`](crate::cache::SharedCache).
pub struct LruStore<V> {
    /// Key-value storage
    entries: HashMap<String, V>,
    /// LRU access tracker
    lru: LruTracker,
    /// Lookup and eviction counters
    stats: CacheStats,
    /// Capacity in bytes, 0 = unlimited
    max_bytes: usize,
    /// Resident size in bytes
    nbytes: usize,
    /// Called for each evicted entry
    on_evicted: Option<EvictHook<V>>,
}

impl<V: ByteSize> LruStore<V> {
    // == Constructor ==
    /// Creates an empty store holding at most `max_bytes` bytes.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_bytes,
            nbytes: 0,
            on_evicted: None,
        }
    }

    /// Creates an empty store that reports evictions to `hook`.
    pub fn with_evict_hook<F>(max_bytes: usize, hook: F) -> Self
    where
        F: FnMut(&str, &V) + Send + 'static,
    {
        let mut store = Self::new(max_bytes);
        store.on_evicted = Some(Box::new(hook));
        store
    }

    // == Get ==
    /// Looks up a key and marks it as most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        match self.entries.get(key) {
            Some(value) => {
                self.stats.record_hit();
                self.lru.touch(key);
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Add ==
    /// Inserts or replaces a value, then evicts until the capacity holds.
    ///
    /// Replacing an existing key adjusts the resident size by the difference
    /// between the old and the new value. If the new entry alone exceeds the
    /// capacity it is evicted as well.
    pub fn add(&mut self, key: String, value: V) {
        let size = value.byte_size();
        self.lru.touch(&key);

        match self.entries.get_mut(&key) {
            Some(existing) => {
                self.nbytes = self.nbytes - existing.byte_size() + size;
                *existing = value;
            }
            None => {
                self.nbytes += key.len() + size;
                self.entries.insert(key, value);
            }
        }

        while self.max_bytes != 0 && self.nbytes > self.max_bytes {
            if self.remove_oldest().is_none() {
                break;
            }
        }
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry and returns it.
    pub fn remove_oldest(&mut self) -> Option<(String, V)> {
        let key = self.lru.evict_oldest()?;
        let value = self.entries.remove(&key)?;

        let size = key.len() + value.byte_size();
        self.nbytes -= size;
        self.stats.record_eviction(size);
        if let Some(hook) = self.on_evicted.as_mut() {
            hook(&key, &value);
        }

        Some((key, value))
    }

    // == Stats ==
    /// Returns a snapshot of the counters and residency.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_residency(self.entries.len(), self.nbytes);
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resident size in bytes.
    pub fn nbytes(&self) -> usize {
        self.nbytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }
}

impl<V> fmt::Debug for LruStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruStore")
            .field("entries", &self.entries.len())
            .field("max_bytes", &self.max_bytes)
            .field("nbytes", &self.nbytes)
            .finish_non_exhaustive()
    }
}
