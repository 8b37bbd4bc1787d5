//! Group Registry
//!
//! Process-wide lookup of groups by name.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::info;

use crate::error::{CacheError, Result};
use crate::group::{Getter, Group};

// == Registry ==
/// Owns every group of a node. Share it behind an `Arc`.
#[derive(Default)]
pub struct Registry {
    groups: RwLock<HashMap<String, Group>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // == New Group ==
    /// Creates and registers a group.
    ///
    /// `cache_bytes` bounds the local store of the group; zero means
    /// unbounded. Fails with [`CacheError::GroupExists`] if the name is taken.
    pub fn new_group<G: Getter>(&self, name: &str, cache_bytes: usize, getter: G) -> Result<Group> {
        let mut groups = self.groups.write();
        if groups.contains_key(name) {
            return Err(CacheError::GroupExists(name.to_string()));
        }

        let group = Group::new(name, cache_bytes, getter);
        groups.insert(name.to_string(), group.clone());
        info!("Registered group {} with {} cache bytes", name, cache_bytes);

        Ok(group)
    }

    /// Returns the group registered under `name`.
    pub fn get_group(&self, name: &str) -> Option<Group> {
        self.groups.read().get(name).cloned()
    }

    /// Names of all registered groups, sorted.
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("groups", &self.group_names())
            .finish()
    }
}
