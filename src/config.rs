//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;

use crate::ring::DEFAULT_REPLICAS;

const DEFAULT_PORT: u16 = 8001;
const DEFAULT_CACHE_BYTES: usize = 2 << 10;
const DEFAULT_GROUP: &str = "scores";

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Base URL under which the other nodes reach this one
    pub self_addr: String,
    /// Base URLs of every node in the cluster, this one included
    pub peers: Vec<String>,
    /// Byte capacity of the demo group's local store (0 = unbounded)
    pub cache_bytes: usize,
    /// Ring positions per peer
    pub replicas: usize,
    /// Name of the demo group
    pub group_name: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8001)
    /// - `SELF_ADDR` - This node's base URL (default: `http://127.0.0.1:<port>`)
    /// - `PEERS` - Comma separated base URLs (default: this node only)
    /// - `CACHE_BYTES` - Local store capacity in bytes (default: 2048)
    /// - `REPLICAS` - Ring positions per peer (default: 50)
    /// - `GROUP_NAME` - Demo group name (default: scores)
    pub fn from_env() -> Self {
        let server_port = parse_var("SERVER_PORT").unwrap_or(DEFAULT_PORT);
        let self_addr = env::var("SELF_ADDR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| local_addr(server_port));
        let peers = env::var("PEERS")
            .ok()
            .map(|v| parse_peers(&v))
            .filter(|peers| !peers.is_empty())
            .unwrap_or_else(|| vec![self_addr.clone()]);

        Self {
            server_port,
            self_addr,
            peers,
            cache_bytes: parse_var("CACHE_BYTES").unwrap_or(DEFAULT_CACHE_BYTES),
            replicas: parse_var("REPLICAS").unwrap_or(DEFAULT_REPLICAS),
            group_name: env::var("GROUP_NAME")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_GROUP.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let self_addr = local_addr(DEFAULT_PORT);
        Self {
            server_port: DEFAULT_PORT,
            peers: vec![self_addr.clone()],
            self_addr,
            cache_bytes: DEFAULT_CACHE_BYTES,
            replicas: DEFAULT_REPLICAS,
            group_name: DEFAULT_GROUP.to_string(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn local_addr(port: u16) -> String {
    format!("http://127.0.0.1:{}", port)
}

/// Splits a comma separated peer list, dropping blanks.
fn parse_peers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
