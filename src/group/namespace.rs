//! Group Module
//!
//! A named cache namespace tying together the local cache, the peer picker,
//! and the loader.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::cache::{ByteView, ConcurrentCache, GroupStats, StatsSnapshot};
use crate::error::{CacheError, Result};
use crate::group::{Flight, Loader, LoaderFn};
use crate::peers::{PeerGetter, PeerPicker};

// == Group Builder ==
/// Collects the settings for a [`Group`]; `build` fails without a loader.
pub struct GroupBuilder {
    name: String,
    cache_bytes: usize,
    loader: Option<Arc<dyn Loader>>,
}

impl GroupBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cache_bytes: 0,
            loader: None,
        }
    }

    /// Byte budget of the group's cache (`0` = unbounded).
    pub fn cache_bytes(mut self, cache_bytes: usize) -> Self {
        self.cache_bytes = cache_bytes;
        self
    }

    /// Sets the loader consulted on misses the peers cannot serve.
    pub fn loader(mut self, loader: Arc<dyn Loader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Uses a plain function as the loader.
    pub fn loader_fn<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync + 'static,
    {
        self.loader(Arc::new(LoaderFn(f)))
    }

    // == Build ==
    pub fn build(self) -> Result<Group> {
        let loader = self
            .loader
            .ok_or_else(|| CacheError::MissingLoader(self.name.clone()))?;

        Ok(Group {
            name: self.name,
            loader,
            main_cache: ConcurrentCache::new(self.cache_bytes),
            peers: OnceLock::new(),
            loads: Flight::new(),
            stats: GroupStats::new(),
        })
    }
}

// == Group ==
/// A cache namespace. Misses are served by the key's owning peer when it is
/// remote, otherwise by the loader; only local loads populate the cache.
pub struct Group {
    name: String,
    loader: Arc<dyn Loader>,
    main_cache: ConcurrentCache,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    /// One outstanding load per key
    loads: Flight<ByteView, CacheError>,
    stats: GroupStats,
}

impl Group {
    pub fn builder(name: impl Into<String>) -> GroupBuilder {
        GroupBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cache(&self) -> &ConcurrentCache {
        &self.main_cache
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    // == Register Peers ==
    /// Attaches the peer picker. Only one may ever be registered.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) -> Result<()> {
        self.peers
            .set(peers)
            .map_err(|_| CacheError::PeersAlreadyRegistered(self.name.clone()))
    }

    // == Get ==
    /// Returns the value for `key`, loading it on a miss.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }
        self.stats.record_get();

        if let Some(value) = self.main_cache.get(key) {
            debug!(group = %self.name, key, "cache hit");
            self.stats.record_cache_hit();
            return Ok(value);
        }

        self.load(key).await
    }

    /// Serves a request that arrived from another peer.
    pub async fn serve_peer(&self, key: &str) -> Result<ByteView> {
        self.stats.record_server_request();
        self.get(key).await
    }

    async fn load(&self, key: &str) -> Result<ByteView> {
        self.loads
            .run(key, || async move {
                // A load that finished just before we joined has filled the cache
                if let Some(value) = self.main_cache.get(key) {
                    self.stats.record_cache_hit();
                    return Ok(value);
                }

                if let Some(peer) = self.peers.get().and_then(|peers| peers.pick_peer(key)) {
                    match self.get_from_peer(peer.as_ref(), key).await {
                        Ok(value) => {
                            self.stats.record_peer_load();
                            return Ok(value);
                        }
                        Err(e) => {
                            self.stats.record_peer_error();
                            warn!(group = %self.name, key, error = %e, "failed to get from peer");
                        }
                    }
                }

                self.get_locally(key).await
            })
            .await
    }

    /// Remote values are returned as-is and not cached here.
    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let bytes = peer.fetch(&self.name, key).await?;
        Ok(ByteView::from(bytes))
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = self.loader.load(key).await.map_err(|e| {
            self.stats.record_local_load_err();
            CacheError::loader(e)
        })?;
        self.stats.record_local_load();

        // The loader hands over its buffer, so nothing else can alias it
        let value = ByteView::from(bytes);
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.add(key, value);
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("cache", &self.main_cache)
            .field("has_peers", &self.peers.get().is_some())
            .finish()
    }
}
