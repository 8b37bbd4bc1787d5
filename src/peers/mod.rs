//! Peer Module
//!
//! Capabilities a group uses to reach the rest of the fleet. Routing
//! ([`PeerPicker`]) is kept apart from transport ([`PeerGetter`]) so the
//! routing policy can be exercised without any network I/O.

mod http;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PeerError;
use crate::models::{FetchRequest, FetchResponse};

pub use http::{HttpGetter, HttpPool, PoolOptions, DEFAULT_BASE_PATH};
pub use memory::{MemoryGetter, MemoryPool};

/// Fetches a value from one remote node.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    /// Asks the peer for `req.key` in `req.group`.
    async fn get(&self, req: &FetchRequest) -> Result<FetchResponse, PeerError>;
}

/// Decides which node owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the getter of the owning peer, or None when the ring is
    /// empty or the local node owns `key`.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}
