//! Cache Module
//!
//! Byte-budgeted LRU storage, its locked wrapper, and the cached value type.

mod byteview;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use byteview::ByteView;
pub use lru::{EvictionCallback, LruCache, Value};
pub use stats::{GroupStats, StatsSnapshot};
pub use store::ConcurrentCache;
