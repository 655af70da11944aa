//! API Routes
//!
//! Configures the Axum router for a cache node.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, peer_handler, stats_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET {base_path}*` - Peer value lookups
/// - `GET /stats` - Per-group statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let peer_route = format!("{}*rest", state.pool.base_path());

    Router::new()
        .route(&peer_route, get(peer_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{Group, GroupRegistry};
    use crate::peers::PeerPool;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn create_test_app(base_path: &str) -> Router {
        let registry = Arc::new(GroupRegistry::new());
        registry
            .create(Group::builder("scores").loader_fn(|key| Ok(key.as_bytes().to_vec())))
            .unwrap();
        let pool = Arc::new(PeerPool::with_options("http://localhost:8001", base_path, 3));
        create_router(AppState::new(registry, pool))
    }

    async fn get_status(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let status = get_status(create_test_app("/_geecache/"), "/health").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let status = get_status(create_test_app("/_geecache/"), "/stats").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_peer_endpoint() {
        let status = get_status(create_test_app("/_geecache/"), "/_geecache/scores/key").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_custom_base_path() {
        let app = create_test_app("/cache/peers");
        assert_eq!(
            get_status(app.clone(), "/cache/peers/scores/key").await,
            StatusCode::OK
        );
        assert_eq!(
            get_status(app, "/_geecache/scores/key").await,
            StatusCode::NOT_FOUND
        );
    }
}
