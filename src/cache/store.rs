//! Concurrent Cache Module
//!
//! Mutex-guarded wrapper around a lazily built [`LruCache`].

use parking_lot::Mutex;

use crate::cache::{ByteView, LruCache};

// == Concurrent Cache ==
/// Thread-safe cache handle owned by a group.
///
/// The underlying LRU is only allocated on the first `add`. Every operation
/// holds the lock for its full, constant-time duration and never performs I/O.
#[derive(Debug)]
pub struct ConcurrentCache {
    cache_bytes: usize,
    lru: Mutex<Option<LruCache<ByteView>>>,
}

impl ConcurrentCache {
    // == Constructor ==
    /// Creates a cache with a byte budget (`0` = unbounded).
    pub fn new(cache_bytes: usize) -> Self {
        Self {
            cache_bytes,
            lru: Mutex::new(None),
        }
    }

    // == Add ==
    /// Inserts or updates `key`, allocating the LRU on first use.
    pub fn add(&self, key: &str, value: ByteView) {
        let mut guard = self.lru.lock();
        guard
            .get_or_insert_with(|| LruCache::new(self.cache_bytes))
            .add(key, value);
    }

    // == Get ==
    /// Returns a clone of the cached view, `None` on a miss or before first use.
    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut guard = self.lru.lock();
        guard.as_mut()?.get(key).cloned()
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.lru.lock().as_ref().map_or(0, LruCache::len)
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes accounted to resident entries.
    pub fn bytes(&self) -> usize {
        self.lru.lock().as_ref().map_or(0, LruCache::bytes)
    }

    /// Whether the LRU has been allocated yet.
    pub fn is_initialized(&self) -> bool {
        self.lru.lock().is_some()
    }

    /// Configured byte budget.
    pub fn capacity(&self) -> usize {
        self.cache_bytes
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_get_before_first_add() {
        let cache = ConcurrentCache::new(1024);
        assert!(cache.get("missing").is_none());
        assert!(!cache.is_initialized());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_add_initializes_lazily() {
        let cache = ConcurrentCache::new(1024);
        cache.add("Tom", ByteView::from("630"));

        assert!(cache.is_initialized());
        assert_eq!(cache.get("Tom").map(|v| v.as_string()), Some("630".to_string()));
        assert_eq!(cache.bytes(), 6);
    }

    #[test]
    fn test_budget_is_applied() {
        let cache = ConcurrentCache::new(10);
        cache.add("aaaa", ByteView::from("1111"));
        cache.add("bbbb", ByteView::from("2222"));

        assert!(cache.get("aaaa").is_none());
        assert!(cache.get("bbbb").is_some());
        assert_eq!(cache.capacity(), 10);
    }

    #[test]
    fn test_concurrent_adds() {
        let cache = Arc::new(ConcurrentCache::new(0));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        cache.add(&format!("{}-{}", t, i), ByteView::from("v"));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 800);
    }
}
