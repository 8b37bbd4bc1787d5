//! In-Process Peer Pool
//!
//! Peer routing over the same hash ring as [`super::HttpPool`], but the
//! "network" is a direct call into another node's [`Registry`]. Lets a whole
//! cluster run inside one process.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::api::serve_fetch;
use crate::error::PeerError;
use crate::group::Registry;
use crate::models::{FetchRequest, FetchResponse};
use crate::peers::{PeerGetter, PeerPicker};
use crate::ring::{HashRing, DEFAULT_REPLICAS};

struct MemoryPeers {
    ring: HashRing,
    getters: HashMap<String, Arc<MemoryGetter>>,
}

// == Memory Pool ==
/// Routes keys to in-process nodes by consistent hashing.
///
/// Nodes are held weakly: groups hold their picker, so strong references
/// between nodes would never be freed.
pub struct MemoryPool {
    self_id: String,
    replicas: usize,
    peers: Mutex<MemoryPeers>,
}

impl MemoryPool {
    pub fn new(self_id: impl Into<String>) -> Self {
        Self::with_replicas(self_id, DEFAULT_REPLICAS)
    }

    pub fn with_replicas(self_id: impl Into<String>, replicas: usize) -> Self {
        Self {
            self_id: self_id.into(),
            replicas,
            peers: Mutex::new(MemoryPeers {
                ring: HashRing::new(replicas, None),
                getters: HashMap::new(),
            }),
        }
    }

    /// Replaces the whole node list. The list should include this node.
    pub fn set_peers(&self, peers: &[(String, Arc<Registry>)]) {
        let ids: Vec<&str> = peers.iter().map(|(id, _)| id.as_str()).collect();
        let mut ring = HashRing::new(self.replicas, None);
        ring.set_nodes(&ids);

        let getters = peers
            .iter()
            .map(|(id, registry)| {
                let getter = MemoryGetter {
                    node: id.clone(),
                    registry: Arc::downgrade(registry),
                };
                (id.clone(), Arc::new(getter))
            })
            .collect();

        *self.peers.lock() = MemoryPeers { ring, getters };
    }

    pub fn self_id(&self) -> &str {
        &self.self_id
    }
}

impl PeerPicker for MemoryPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let peers = self.peers.lock();
        let owner = peers.ring.route(key)?;
        if owner == self.self_id {
            return None;
        }

        debug!("Pick in-process peer {} for key {}", owner, key);
        let getter: Arc<dyn PeerGetter> = peers.getters.get(owner)?.clone();
        Some(getter)
    }
}

impl fmt::Debug for MemoryPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let peers = self.peers.lock();
        f.debug_struct("MemoryPool")
            .field("self_id", &self.self_id)
            .field("peers", &peers.ring.nodes())
            .finish()
    }
}

// == Memory Getter ==
/// Fetches from one in-process node.
pub struct MemoryGetter {
    node: String,
    registry: Weak<Registry>,
}

#[async_trait]
impl PeerGetter for MemoryGetter {
    async fn get(&self, req: &FetchRequest) -> Result<FetchResponse, PeerError> {
        let registry = self
            .registry
            .upgrade()
            .ok_or_else(|| PeerError::Remote(format!("node {} is gone", self.node)))?;

        let value = serve_fetch(&registry, &req.group, &req.key)
            .await
            .map_err(|e| PeerError::Remote(e.to_string()))?;

        Ok(FetchResponse::from(&value))
    }
}
