//! HTTP Peer Pool
//!
//! Network-backed peer routing and fetching over a consistent hash ring.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::PeerError;
use crate::models::{ErrorResponse, FetchRequest, FetchResponse};
use crate::peers::{PeerGetter, PeerPicker};
use crate::ring::{HashFn, HashRing, DEFAULT_REPLICAS};

/// Path of the peer endpoint on every node.
pub const DEFAULT_BASE_PATH: &str = "/_peercache";

// == Pool Options ==
/// Tuning knobs for an [`HttpPool`].
#[derive(Clone)]
pub struct PoolOptions {
    /// Path the peer endpoint is mounted at
    pub base_path: String,
    /// Ring positions per peer
    pub replicas: usize,
    /// Ring hash function, CRC-32 when None
    pub hash: Option<HashFn>,
    /// Client shared by all peer getters (timeouts, TLS, pooling)
    pub client: reqwest::Client,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            hash: None,
            client: reqwest::Client::new(),
        }
    }
}

/// Ring and per-peer getters, replaced together on every membership change
struct PeerSet {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

// == HTTP Pool ==
/// Routes keys to peers by consistent hashing and fetches over HTTP.
///
/// Peers are identified by their base URL (e.g. `http://10.0.0.1:8001`);
/// `self_addr` must use the same spelling as the entry for this node in the
/// peer list or the node will try to fetch from itself.
pub struct HttpPool {
    self_addr: String,
    options: PoolOptions,
    peers: Mutex<PeerSet>,
}

impl HttpPool {
    // == Constructor ==
    /// Creates a pool for the node reachable at `self_addr` with no peers.
    pub fn new(self_addr: impl Into<String>) -> Self {
        Self::with_options(self_addr, PoolOptions::default())
    }

    pub fn with_options(self_addr: impl Into<String>, options: PoolOptions) -> Self {
        let ring = HashRing::new(options.replicas, options.hash.clone());
        Self {
            self_addr: self_addr.into(),
            options,
            peers: Mutex::new(PeerSet {
                ring,
                getters: HashMap::new(),
            }),
        }
    }

    // == Set Peers ==
    /// Replaces the whole peer list. The list should include this node.
    pub fn set_peers<S: AsRef<str>>(&self, peers: &[S]) {
        let mut ring = HashRing::new(self.options.replicas, self.options.hash.clone());
        ring.set_nodes(peers);

        let getters = peers
            .iter()
            .map(|peer| {
                let peer = peer.as_ref();
                let url = format!("{}{}", peer.trim_end_matches('/'), self.options.base_path);
                let getter = HttpGetter::new(url, self.options.client.clone());
                (peer.to_string(), Arc::new(getter))
            })
            .collect();

        *self.peers.lock() = PeerSet { ring, getters };
        debug!("Peer set of {} replaced with {} peers", self.self_addr, peers.len());
    }

    /// Returns the current peers, sorted.
    pub fn peers(&self) -> Vec<String> {
        self.peers
            .lock()
            .ring
            .nodes()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    pub fn base_path(&self) -> &str {
        &self.options.base_path
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let peers = self.peers.lock();
        let owner = peers.ring.route(key)?;
        if owner == self.self_addr {
            return None;
        }

        debug!("Pick peer {} for key {}", owner, key);
        let getter: Arc<dyn PeerGetter> = peers.getters.get(owner)?.clone();
        Some(getter)
    }
}

impl fmt::Debug for HttpPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpPool")
            .field("self_addr", &self.self_addr)
            .field("base_path", &self.options.base_path)
            .field("peers", &self.peers())
            .finish()
    }
}

// == HTTP Getter ==
/// Fetches values from one peer's endpoint.
///
/// Request: `GET {url}?group=..&key=..`. Success: a bincode encoded
/// [`FetchResponse`]. Failure: any non-2xx status, usually with an
/// [`ErrorResponse`] JSON body.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    url: String,
    client: reqwest::Client,
}

impl HttpGetter {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn get(&self, req: &FetchRequest) -> Result<FetchResponse, PeerError> {
        let response = self.client.get(&self.url).query(req).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error,
                Err(_) => status.canonical_reason().unwrap_or("unknown").to_string(),
            };
            return Err(PeerError::Status { status, message });
        }

        let body = response.bytes().await?;
        Ok(FetchResponse::decode(&body)?)
    }
}
