//! Peercache - A distributed read-through cache
//!
//! Groups answer lookups from a byte-budgeted LRU, from the key's owning peer
//! on a consistent hash ring, or from a caller-supplied loader, collapsing
//! concurrent misses for the same key into a single load.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod group;
pub mod models;
pub mod peers;

pub use api::AppState;
pub use cache::ByteView;
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{Group, GroupBuilder, GroupRegistry, Loader, LoaderFn};
pub use peers::{PeerGetter, PeerPicker, PeerPool};
