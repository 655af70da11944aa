//! Peercache - A distributed read-through cache node
//!
//! Serves one demo group backed by an in-memory "slow database" and shares
//! keys with the configured peers.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peercache::api::{create_router, AppState};
use peercache::{Config, Group, GroupRegistry, PeerPool};

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the demo group and register it
/// 4. Build the peer pool and attach it to the group
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peercache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Peercache node");

    let config = Config::from_env();
    info!(
        "Configuration loaded: self={}, peers={:?}, base_path={}, cache_bytes={}, port={}",
        config.self_url, config.peers, config.base_path, config.cache_bytes, config.server_port
    );

    let db: HashMap<&'static str, &'static str> =
        HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]);

    let registry = Arc::new(GroupRegistry::new());
    let group = registry.create(
        Group::builder(config.group_name.clone())
            .cache_bytes(config.cache_bytes)
            .loader_fn(move |key| {
                info!("[SlowDB] search key {}", key);
                db.get(key)
                    .map(|v| v.as_bytes().to_vec())
                    .ok_or_else(|| anyhow::anyhow!("{} not exist", key))
            }),
    )?;

    let pool = Arc::new(PeerPool::with_options(
        config.self_url.clone(),
        config.base_path.clone(),
        config.replicas,
    ));
    pool.set_peers(config.peers.clone());
    group.register_peers(pool.clone())?;

    let app = create_router(AppState::new(registry, pool));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Peercache node listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
