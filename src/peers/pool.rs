//! HTTP Peer Pool
//!
//! Picks key owners from a [`HashRing`] and fetches from them over HTTP.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::error::{CacheError, Result};
use crate::peers::{HashRing, PeerGetter, PeerPicker};

// == Public Constants ==
/// Path prefix reserved for peer-to-peer requests
pub const DEFAULT_BASE_PATH: &str = "/_geecache/";

/// Virtual nodes per peer on the hash ring
pub const DEFAULT_REPLICAS: usize = 50;

// == HTTP Getter ==
/// Client handle bound to one remote peer.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    /// Peer URL including the base path, e.g. `http://10.0.0.2:8008/_geecache/`
    base_url: String,
    client: reqwest::Client,
}

impl HttpGetter {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// URL of `key` within `group` on this peer.
    pub fn url_for(&self, group: &str, key: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            urlencoding::encode(group),
            urlencoding::encode(key)
        )
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        let url = self.url_for(group, key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CacheError::Peer(format!("request to {} failed: {}", url, e)))?;

        if response.status() != StatusCode::OK {
            return Err(CacheError::Peer(format!(
                "server returned: {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CacheError::Peer(format!("reading response body: {}", e)))?;

        Ok(body.to_vec())
    }
}

// == Peer Set ==
/// Ring and clients for one configured peer list; replaced as a whole.
#[derive(Debug)]
struct PeerSet {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

// == Peer Pool ==
/// The local node's view of the cluster and its peer-to-peer HTTP settings.
#[derive(Debug)]
pub struct PeerPool {
    /// This node's base URL, e.g. `http://localhost:8001`
    self_url: String,
    base_path: String,
    replicas: usize,
    client: reqwest::Client,
    peers: Mutex<PeerSet>,
}

impl PeerPool {
    // == Constructor ==
    /// Creates a pool with the default base path and replica count.
    pub fn new(self_url: impl Into<String>) -> Self {
        Self::with_options(self_url, DEFAULT_BASE_PATH, DEFAULT_REPLICAS)
    }

    /// Creates a pool with an explicit base path and virtual node count.
    pub fn with_options(
        self_url: impl Into<String>,
        base_path: impl Into<String>,
        replicas: usize,
    ) -> Self {
        Self {
            self_url: normalize_peer_url(&self_url.into()),
            base_path: normalize_base_path(&base_path.into()),
            replicas,
            client: reqwest::Client::new(),
            peers: Mutex::new(PeerSet {
                ring: HashRing::new(replicas),
                getters: HashMap::new(),
            }),
        }
    }

    pub fn self_url(&self) -> &str {
        &self.self_url
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    // == Set Peers ==
    /// Replaces the peer list, rebuilding the ring and every client handle.
    ///
    /// Peers are base URLs such as `http://localhost:8002`; the local node
    /// should be included so it owns its share of the ring. Entries are
    /// normalised like the local URL and blank ones are dropped.
    pub fn set_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peers: Vec<String> = peers
            .into_iter()
            .map(|peer| normalize_peer_url(&peer.into()))
            .filter(|peer| !peer.is_empty())
            .collect();

        let mut ring = HashRing::new(self.replicas);
        ring.add(&peers);

        let getters = peers
            .iter()
            .map(|peer| {
                let getter = HttpGetter::new(
                    format!("{}{}", peer, self.base_path),
                    self.client.clone(),
                );
                (peer.clone(), Arc::new(getter))
            })
            .collect();

        *self.peers.lock() = PeerSet { ring, getters };
        info!(node = %self.self_url, peers = peers.len(), "peer set updated");
    }

    /// Peer that owns `key` according to the current ring.
    pub fn owner_of(&self, key: &str) -> Option<String> {
        self.peers.lock().ring.get(key).map(str::to_string)
    }

    // == Parse Peer Path ==
    /// Splits an inbound request path into its group name and key.
    ///
    /// A path outside the base path is an [`CacheError::UnexpectedPath`];
    /// anything other than exactly two segments after it is a
    /// [`CacheError::BadRequest`].
    pub fn parse_peer_path(&self, path: &str) -> Result<(String, String)> {
        let rest = path
            .strip_prefix(self.base_path.as_str())
            .ok_or_else(|| CacheError::UnexpectedPath(path.to_string()))?;

        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() != 2 {
            return Err(CacheError::BadRequest(format!(
                "expected {}<group>/<key>, got {}",
                self.base_path, path
            )));
        }

        let group = decode_segment(parts[0])?;
        let key = decode_segment(parts[1])?;
        Ok((group, key))
    }
}

impl PeerPicker for PeerPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let peers = self.peers.lock();
        let peer = peers.ring.get(key)?;
        if peer.is_empty() || peer == self.self_url {
            return None;
        }

        debug!(node = %self.self_url, peer, key, "pick peer");
        peers
            .getters
            .get(peer)
            .map(|getter| getter.clone() as Arc<dyn PeerGetter>)
    }
}

/// Canonical form of a node URL: surrounding whitespace and trailing `/` removed.
///
/// The local URL and ring identifiers must agree exactly, otherwise a node
/// takes its own keys for remote ones.
pub fn normalize_peer_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn decode_segment(segment: &str) -> Result<String> {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .map_err(|e| CacheError::BadRequest(format!("invalid path segment {}: {}", segment, e)))
}

/// Ensures the base path starts and ends with `/`.
fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}
