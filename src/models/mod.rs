//! Response models for the cache server API
//!
//! DTOs serialized as JSON by the health and stats endpoints. Peer responses
//! carry raw bytes and have no model.

pub mod responses;

// Re-export commonly used types
pub use responses::{GroupStatsResponse, HealthResponse};
