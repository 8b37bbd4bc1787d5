//! Group Module
//!
//! A group is a named cache namespace: a loader, a bounded local store,
//! optional peers and a coalescer tied together behind [`Group::get`].
//!
//! ```text
//! get(key) -> local hit? ----------------------------> return
//!          -> coalesce -> peer owns key? -> fetch ---> return (not stored)
//!                                 | no / failed
//!                                 v
//!                              loader -> store -----> return
//! ```

mod getter;
mod registry;
mod stats;

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::{debug, info, warn};

use crate::cache::{ByteView, CacheStats, SharedCache};
use crate::error::{CacheError, PeerError, Result};
use crate::flight::Flight;
use crate::models::FetchRequest;
use crate::peers::{PeerGetter, PeerPicker};

pub use getter::Getter;
pub use registry::Registry;
pub use stats::{GroupStats, GroupStatsSnapshot};

// == Group ==
/// A cache namespace. Cloning is cheap and every clone is the same group.
#[derive(Clone)]
pub struct Group {
    inner: Arc<GroupInner>,
}

struct GroupInner {
    name: String,
    getter: Box<dyn Getter>,
    main_cache: SharedCache,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    loader: Flight<Result<ByteView>>,
    stats: GroupStats,
}

impl Group {
    /// Groups are created through [`Registry::new_group`], which keeps names
    /// unique.
    pub(crate) fn new<G: Getter>(name: &str, cache_bytes: usize, getter: G) -> Self {
        Self {
            inner: Arc::new(GroupInner {
                name: name.to_string(),
                getter: Box::new(getter),
                main_cache: SharedCache::new(cache_bytes),
                peers: OnceLock::new(),
                loader: Flight::new(),
                stats: GroupStats::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    // == Register Peers ==
    /// Attaches the peer picker used to find remote owners of keys.
    ///
    /// # Panics
    /// If called more than once on the same group.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) {
        if self.inner.peers.set(peers).is_err() {
            panic!("register_peers called more than once for group {}", self.inner.name);
        }
    }

    // == Get ==
    /// Returns the value for `key`, loading it on a miss.
    ///
    /// Concurrent misses for the same key share one load. There is no
    /// timeout; wrap the call in `tokio::time::timeout` to bound latency.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }

        self.inner.stats.record_get();
        if let Some(value) = self.inner.main_cache.get(key) {
            self.inner.stats.record_cache_hit();
            debug!("[{}] cache hit for key {}", self.inner.name, key);
            return Ok(value);
        }

        self.load(key).await
    }

    async fn load(&self, key: &str) -> Result<ByteView> {
        let group = self.clone();
        let owned = key.to_string();

        self.inner
            .loader
            .work(key, async move { group.load_once(&owned).await })
            .await?
    }

    /// One coalesced load: the owning peer first, the loader otherwise.
    async fn load_once(&self, key: &str) -> Result<ByteView> {
        self.inner.stats.record_load();

        let peer = self.inner.peers.get().and_then(|peers| peers.pick_peer(key));
        if let Some(peer) = peer {
            match self.get_from_peer(peer.as_ref(), key).await {
                Ok(value) => {
                    self.inner.stats.record_peer_load();
                    return Ok(value);
                }
                Err(err) => {
                    self.inner.stats.record_peer_error();
                    warn!(
                        "[{}] failed to get key {} from peer, loading locally: {}",
                        self.inner.name, key, err
                    );
                }
            }
        }

        self.get_locally(key).await
    }

    async fn get_from_peer(
        &self,
        peer: &dyn PeerGetter,
        key: &str,
    ) -> std::result::Result<ByteView, PeerError> {
        let req = FetchRequest::new(self.inner.name.as_str(), key);
        let resp = peer.get(&req).await?;
        Ok(ByteView::from(resp.value))
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = match self.inner.getter.get(key).await {
            Ok(bytes) => bytes,
            Err(err) => {
                self.inner.stats.record_local_load_err();
                return Err(err.into());
            }
        };

        self.inner.stats.record_local_load();
        info!("[{}] loaded key {} from source", self.inner.name, key);

        let value = ByteView::from(bytes);
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.inner.main_cache.add(key, value);
    }

    /// Lookup path counters.
    pub fn stats(&self) -> GroupStatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Local store counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.inner.main_cache.stats()
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.inner.name)
            .field("cache_bytes", &self.inner.main_cache.cache_bytes())
            .field("has_peers", &self.inner.peers.get().is_some())
            .finish()
    }
}
