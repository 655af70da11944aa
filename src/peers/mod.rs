//! Peers Module
//!
//! Key ownership across nodes and the HTTP transport between them.
//!
//! # Wire format
//! - `GET {base_path}{group}/{key}` with both segments percent-encoded
//! - `200` with an `application/octet-stream` body holding the raw value

mod pool;
mod ring;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

pub use pool::{normalize_peer_url, HttpGetter, PeerPool, DEFAULT_BASE_PATH, DEFAULT_REPLICAS};
pub use ring::{HashFn, HashRing};

// == Peer Picker ==
/// Chooses the node that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns a getter for the owning peer, or `None` when the key should be
    /// served by this node.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

// == Peer Getter ==
/// Fetches a value from a remote node.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    async fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>>;
}
