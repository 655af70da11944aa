//! API Handlers
//!
//! HTTP request handlers for the peer endpoint and node introspection.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Uri},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info};

use crate::error::{CacheError, Result};
use crate::group::GroupRegistry;
use crate::models::{GroupStatsResponse, HealthResponse};
use crate::peers::PeerPool;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Groups this node can serve
    pub registry: Arc<GroupRegistry>,
    /// This node's peer settings and ring
    pub pool: Arc<PeerPool>,
}

impl AppState {
    pub fn new(registry: Arc<GroupRegistry>, pool: Arc<PeerPool>) -> Self {
        Self { registry, pool }
    }
}

/// Handler for GET {base_path}:group/:key
///
/// Runs the group's full lookup and returns the raw value bytes.
pub async fn peer_handler(State(state): State<AppState>, uri: Uri) -> Result<Response> {
    let path = uri.path();
    info!(node = %state.pool.self_url(), "GET {}", path);

    let (group_name, key) = state.pool.parse_peer_path(path).inspect_err(|e| {
        if let CacheError::UnexpectedPath(_) = e {
            error!(node = %state.pool.self_url(), error = %e, "peer handler misrouted");
        }
    })?;

    let group = state
        .registry
        .get(&group_name)
        .ok_or(CacheError::GroupNotFound(group_name))?;

    let view = group.serve_peer(&key).await?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        view.bytes(),
    )
        .into_response())
}

/// Handler for GET /stats
///
/// Returns counters for every registered group.
pub async fn stats_handler(State(state): State<AppState>) -> Json<Vec<GroupStatsResponse>> {
    let stats = state
        .registry
        .groups()
        .iter()
        .map(|group| GroupStatsResponse::from_group(group))
        .collect();

    Json(stats)
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
