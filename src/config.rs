//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;

use crate::peers::{normalize_peer_url, DEFAULT_BASE_PATH, DEFAULT_REPLICAS};

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// URL other peers use to reach this node
    pub self_url: String,
    /// Base URLs of every node in the cluster, this one included
    pub peers: Vec<String>,
    /// Path prefix for peer-to-peer requests
    pub base_path: String,
    /// Cache byte budget for the demo group
    pub cache_bytes: usize,
    /// Name of the demo group
    pub group_name: String,
    /// Virtual nodes per peer on the hash ring
    pub replicas: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8001)
    /// - `SELF_URL` - This node's URL (default: `http://localhost:{SERVER_PORT}`)
    /// - `PEERS` - Comma-separated peer URLs (default: `SELF_URL` only)
    /// - `BASE_PATH` - Peer path prefix (default: `/_geecache/`)
    /// - `CACHE_BYTES` - Cache byte budget (default: 2048)
    /// - `GROUP_NAME` - Demo group name (default: `scores`)
    /// - `REPLICAS` - Virtual nodes per peer (default: 50)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let server_port = parse_var("SERVER_PORT").unwrap_or(defaults.server_port);
        let self_url = env::var("SELF_URL")
            .ok()
            .map(|v| normalize_peer_url(&v))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| format!("http://localhost:{}", server_port));
        let peers = env::var("PEERS")
            .ok()
            .map(|v| parse_peers(&v))
            .filter(|peers| !peers.is_empty())
            .unwrap_or_else(|| vec![self_url.clone()]);

        Self {
            server_port,
            self_url,
            peers,
            base_path: env::var("BASE_PATH").unwrap_or(defaults.base_path),
            cache_bytes: parse_var("CACHE_BYTES").unwrap_or(defaults.cache_bytes),
            group_name: env::var("GROUP_NAME").unwrap_or(defaults.group_name),
            replicas: parse_var("REPLICAS").unwrap_or(defaults.replicas),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let self_url = "http://localhost:8001".to_string();
        Self {
            server_port: 8001,
            peers: vec![self_url.clone()],
            self_url,
            base_path: DEFAULT_BASE_PATH.to_string(),
            cache_bytes: 2 << 10,
            group_name: "scores".to_string(),
            replicas: DEFAULT_REPLICAS,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Splits a comma-separated peer list, dropping blank entries and trailing slashes.
fn parse_peers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize_peer_url)
        .filter(|p| !p.is_empty())
        .collect()
}
