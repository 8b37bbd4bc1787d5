//! Consistent Hash Ring Module
//!
//! Maps keys onto a set of node identifiers so that changing the node set
//! only moves a small fraction of keys.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// Number of ring positions per node when none is given.
pub const DEFAULT_REPLICAS: usize = 50;

/// Hash function placing keys and virtual nodes on the ring.
pub type HashFn = Arc<dyn Fn(&[u8]) -> u32 + Send + Sync>;

/// CRC-32 (IEEE), stable across processes and platforms.
pub fn default_hash() -> HashFn {
    Arc::new(crc32fast::hash)
}

// == Hash Ring ==
/// A consistent hash ring with virtual replicas.
///
/// Every node occupies `replicas` positions at `hash("<i><node>")`. A key is
/// owned by the node at the first position at or after the key's hash,
/// wrapping around to the first position. The ring is only ever rebuilt as
/// a whole through [`HashRing::set_nodes`].
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Sorted, deduplicated ring positions
    positions: Vec<u32>,
    /// Owner of every position
    owners: HashMap<u32, String>,
}

impl HashRing {
    // == Constructor ==
    /// Creates an empty ring. A replica count of zero is raised to one and a
    /// missing hash function falls back to [`default_hash`].
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or_else(default_hash),
            replicas: replicas.max(1),
            positions: Vec::new(),
            owners: HashMap::new(),
        }
    }

    // == Set Nodes ==
    /// Replaces the whole node set and rebuilds the ring.
    ///
    /// Duplicates are ignored. Nodes are placed in sorted order and the first
    /// node to claim a position keeps it, so the result does not depend on
    /// the order of `nodes`.
    pub fn set_nodes<S: AsRef<str>>(&mut self, nodes: &[S]) {
        let unique: BTreeSet<&str> = nodes.iter().map(AsRef::as_ref).collect();

        let mut owners = HashMap::with_capacity(unique.len() * self.replicas);
        for node in unique {
            for i in 0..self.replicas {
                let position = (self.hash)(format!("{}{}", i, node).as_bytes());
                owners.entry(position).or_insert_with(|| node.to_string());
            }
        }

        let mut positions: Vec<u32> = owners.keys().copied().collect();
        positions.sort_unstable();

        self.positions = positions;
        self.owners = owners;
    }

    // == Route ==
    /// Returns the node owning `key`, or None if the ring is empty.
    pub fn route(&self, key: &str) -> Option<&str> {
        if self.positions.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.positions.partition_point(|&p| p < hash);
        let position = self.positions[idx % self.positions.len()];

        self.owners.get(&position).map(String::as_str)
    }

    /// Returns the distinct nodes on the ring, sorted.
    pub fn nodes(&self) -> Vec<&str> {
        let unique: BTreeSet<&str> = self.owners.values().map(String::as_str).collect();
        unique.into_iter().collect()
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new(DEFAULT_REPLICAS, None)
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("positions", &self.positions.len())
            .field("nodes", &self.nodes())
            .finish()
    }
}
