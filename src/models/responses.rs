//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing JSON bodies.

use serde::Serialize;

use crate::cache::StatsSnapshot;
use crate::group::Group;

/// One element of the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct GroupStatsResponse {
    /// Group name
    pub name: String,
    /// Entries resident in the group's cache
    pub cache_entries: usize,
    /// Bytes used by resident entries
    pub cache_bytes: usize,
    /// Configured byte budget, 0 = unbounded
    pub cache_capacity: usize,
    /// cache_hits / gets
    pub hit_rate: f64,
    #[serde(flatten)]
    pub counters: StatsSnapshot,
}

impl GroupStatsResponse {
    /// Captures the current state of a group
    pub fn from_group(group: &Group) -> Self {
        let counters = group.stats();
        Self {
            name: group.name().to_string(),
            cache_entries: group.cache().len(),
            cache_bytes: group.cache().bytes(),
            cache_capacity: group.cache().capacity(),
            hit_rate: counters.hit_rate(),
            counters,
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
