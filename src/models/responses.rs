//! Response models
//!
//! Defines the peer fetch payload and the JSON bodies of the HTTP API.

use serde::{Deserialize, Serialize};

use crate::cache::{ByteView, CacheStats};
use crate::group::GroupStatsSnapshot;

/// Successful peer fetch payload.
///
/// Sent as an `application/octet-stream` body holding the bincode encoding
/// of this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResponse {
    /// Raw value bytes
    #[serde(with = "serde_bytes")]
    pub value: Vec<u8>,
}

impl FetchResponse {
    pub fn new(value: Vec<u8>) -> Self {
        Self { value }
    }

    /// Encodes the payload for the response body.
    pub fn encode(&self) -> bincode::Result<Vec<u8>> {
        bincode::serialize(self)
    }

    /// Decodes a response body received from a peer.
    pub fn decode(body: &[u8]) -> bincode::Result<Self> {
        bincode::deserialize(body)
    }
}

impl From<&ByteView> for FetchResponse {
    fn from(view: &ByteView) -> Self {
        Self::new(view.byte_slice())
    }
}

/// Error body for every failed request: `{"error": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats/:group)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Group name
    pub group: String,
    /// Lookup path counters of the group
    pub group_stats: GroupStatsSnapshot,
    /// Local store counters
    pub cache_stats: CacheStats,
    /// Local store hit rate
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(
        group: impl Into<String>,
        group_stats: GroupStatsSnapshot,
        cache_stats: CacheStats,
    ) -> Self {
        let hit_rate = cache_stats.hit_rate();
        Self {
            group: group.into(),
            group_stats,
            cache_stats,
            hit_rate,
        }
    }
}
