//! Cache Module
//!
//! Byte-bounded LRU storage and the thread-safe per-group cache built on it.

mod byteview;
mod lru;
mod shared;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use byteview::{ByteSize, ByteView};
pub use lru::LruTracker;
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use store::{EvictHook, LruStore};
