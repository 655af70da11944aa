//! LRU Cache Module
//!
//! Byte-budgeted Least Recently Used store. Not thread-safe; see
//! [`ConcurrentCache`](crate::cache::ConcurrentCache) for the locked wrapper.

use std::collections::HashMap;
use std::fmt;

// == Value Trait ==
/// A value that can report its size in bytes.
pub trait Value {
    fn len(&self) -> usize;
}

impl Value for String {
    fn len(&self) -> usize {
        String::len(self)
    }
}

impl Value for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }
}

/// Invoked with the key and value of every entry removed by eviction.
pub type EvictionCallback<V> = Box<dyn FnMut(&str, &V) + Send>;

// == Node ==
/// One slot of the recency list. Links are indices into `LruCache::nodes`.
struct Node<V> {
    key: String,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Cache ==
/// Tracks entries in access order and evicts from the tail once the byte
/// budget is exceeded.
///
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// An entry costs `key.len() + value.len()` bytes. A budget of `0` means
/// unbounded.
pub struct LruCache<V: Value> {
    /// Byte budget, 0 = unbounded
    max_bytes: usize,
    /// Bytes used by resident entries
    n_bytes: usize,
    /// Dense node storage; removals swap the last node into the hole
    nodes: Vec<Node<V>>,
    /// Key to node index
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    evictions: u64,
    on_evicted: Option<EvictionCallback<V>>,
}

impl<V: Value> LruCache<V> {
    // == Constructor ==
    /// Creates an empty cache with the given byte budget.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            n_bytes: 0,
            nodes: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            evictions: 0,
            on_evicted: None,
        }
    }

    /// Creates an empty cache that reports evicted entries to `on_evicted`.
    pub fn with_eviction_callback(max_bytes: usize, on_evicted: EvictionCallback<V>) -> Self {
        let mut cache = Self::new(max_bytes);
        cache.on_evicted = Some(on_evicted);
        cache
    }

    // == Get ==
    /// Looks up a key and marks it as most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        Some(&self.nodes[idx].value)
    }

    // == Add ==
    /// Inserts or replaces a value, then evicts from the tail while over budget.
    ///
    /// The new entry is stored before eviction runs, so an entry larger than
    /// the whole budget evicts everything including itself.
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();

        if let Some(&idx) = self.index.get(&key) {
            let node = &mut self.nodes[idx];
            let old_len = node.value.len();
            let new_len = value.len();
            node.value = value;
            self.n_bytes = self.n_bytes - old_len + new_len;
            self.move_to_front(idx);
        } else {
            self.n_bytes += key.len() + value.len();
            let idx = self.nodes.len();
            self.nodes.push(Node {
                key: key.clone(),
                value,
                prev: None,
                next: None,
            });
            self.index.insert(key, idx);
            self.push_front(idx);
        }

        while self.max_bytes != 0 && self.n_bytes > self.max_bytes {
            if self.remove_oldest().is_none() {
                break;
            }
        }
    }

    // == Remove Oldest ==
    /// Removes the least recently used entry and returns it.
    ///
    /// The eviction callback, if any, runs before this returns.
    pub fn remove_oldest(&mut self) -> Option<(String, V)> {
        let idx = self.tail?;
        let node = self.remove_node(idx);
        self.index.remove(&node.key);
        self.n_bytes -= node.key.len() + node.value.len();
        self.evictions += 1;

        if let Some(callback) = self.on_evicted.as_mut() {
            callback(&node.key, &node.value);
        }

        Some((node.key, node.value))
    }

    // == Length ==
    /// Returns the number of resident entries.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no entries are resident.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Bytes currently accounted to resident entries.
    pub fn bytes(&self) -> usize {
        self.n_bytes
    }

    /// Byte budget this cache was created with (`0` = unbounded).
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Number of entries removed through `remove_oldest`.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Keys ordered from most to least recently used.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = Vec::with_capacity(self.nodes.len());
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            keys.push(self.nodes[idx].key.as_str());
            cursor = self.nodes[idx].next;
        }
        keys
    }

    // == List Plumbing ==
    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    fn push_front(&mut self, idx: usize) {
        self.nodes[idx].prev = None;
        self.nodes[idx].next = self.head;
        match self.head {
            Some(head) => self.nodes[head].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        self.nodes[idx].prev = None;
        self.nodes[idx].next = None;
    }

    /// Unlinks and takes the node at `idx`, relocating the last node into the gap.
    fn remove_node(&mut self, idx: usize) -> Node<V> {
        self.unlink(idx);
        let last = self.nodes.len() - 1;
        let node = self.nodes.swap_remove(idx);

        if idx != last {
            let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
            match prev {
                Some(p) => self.nodes[p].next = Some(idx),
                None => self.head = Some(idx),
            }
            match next {
                Some(n) => self.nodes[n].prev = Some(idx),
                None => self.tail = Some(idx),
            }
            if let Some(slot) = self.index.get_mut(&self.nodes[idx].key) {
                *slot = idx;
            }
        }

        node
    }
}

impl<V: Value> fmt::Debug for LruCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("max_bytes", &self.max_bytes)
            .field("n_bytes", &self.n_bytes)
            .field("len", &self.nodes.len())
            .field("evictions", &self.evictions)
            .finish()
    }
}
