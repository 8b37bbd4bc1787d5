//! Peer Cache - A distributed, request-coalescing lookup cache
//!
//! Memoizes expensive key lookups in byte-bounded LRU stores, shares them
//! across a fleet of nodes by consistent hashing and collapses concurrent
//! misses for one key into a single load.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod flight;
pub mod group;
pub mod models;
pub mod peers;
pub mod ring;

pub use api::{create_router, serve_fetch, AppState};
pub use cache::ByteView;
pub use config::Config;
pub use error::{CacheError, PeerError, Result};
pub use group::{Getter, Group, Registry};
pub use peers::{HttpPool, MemoryPool, PeerGetter, PeerPicker, PoolOptions};
