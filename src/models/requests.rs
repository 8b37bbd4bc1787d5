//! Request models
//!
//! Defines what a node asks of a peer and what the frontend API accepts.

use serde::{Deserialize, Serialize};

/// A peer fetch: "give me the value for `key` in group `group`".
///
/// On the wire both fields travel in the query string of
/// `GET {base}?group=..&key=..`, so any string round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Name of the group (namespace)
    pub group: String,
    /// Key within the group
    pub key: String,
}

impl FetchRequest {
    pub fn new(group: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
        }
    }
}

/// Query string of the frontend lookup (`GET /api/:group?key=...`)
#[derive(Debug, Clone, Deserialize)]
pub struct ApiQuery {
    /// The key to look up; a missing key is treated as empty
    #[serde(default)]
    pub key: String,
}
