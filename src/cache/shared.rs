//! Shared Cache Module
//!
//! Thread-safe wrapper around a lazily built [`LruStore`] of byte views.

use parking_lot::Mutex;

use crate::cache::{ByteView, CacheStats, LruStore};

// == Shared Cache ==
/// The per-group local store.
///
/// Reads reorder the recency index, so every access takes the same
/// exclusive lock. The store is only allocated on the first `add`.
#[derive(Debug)]
pub struct SharedCache {
    store: Mutex<Option<LruStore<ByteView>>>,
    cache_bytes: usize,
}

impl SharedCache {
    /// Creates a cache bounded to `cache_bytes` bytes (0 = unlimited).
    pub fn new(cache_bytes: usize) -> Self {
        Self {
            store: Mutex::new(None),
            cache_bytes,
        }
    }

    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut guard = self.store.lock();
        guard.as_mut()?.get(key).cloned()
    }

    pub fn add(&self, key: &str, value: ByteView) {
        let mut guard = self.store.lock();
        guard
            .get_or_insert_with(|| LruStore::new(self.cache_bytes))
            .add(key.to_string(), value);
    }

    /// Returns whether the underlying store has been built yet.
    pub fn is_allocated(&self) -> bool {
        self.store.lock().is_some()
    }

    pub fn stats(&self) -> CacheStats {
        self.store
            .lock()
            .as_ref()
            .map(LruStore::stats)
            .unwrap_or_default()
    }

    pub fn cache_bytes(&self) -> usize {
        self.cache_bytes
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_store_is_built_lazily() {
        let cache = SharedCache::new(1024);

        assert!(cache.get("missing").is_none());
        assert!(!cache.is_allocated());

        cache.add("key", ByteView::from("value"));
        assert!(cache.is_allocated());
        assert_eq!(cache.get("key"), Some(ByteView::from("value")));
    }

    #[test]
    fn test_stats_before_first_add() {
        let cache = SharedCache::new(1024);
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_capacity_is_passed_to_store() {
        let cache = SharedCache::new(4);

        cache.add("a", ByteView::from("1"));
        cache.add("b", ByteView::from("2"));
        cache.add("c", ByteView::from("3"));

        assert!(cache.get("a").is_none());
        assert_eq!(cache.stats().total_bytes, 4);
        assert_eq!(cache.cache_bytes(), 4);
    }

    #[test]
    fn test_concurrent_adds() {
        let cache = Arc::new(SharedCache::new(0));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let key = format!("{}-{}", t, i);
                        cache.add(&key, ByteView::from(key.as_str()));
                        assert!(cache.get(&key).is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.stats().total_entries, 800);
    }
}
