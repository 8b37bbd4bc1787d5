//! Peer Cache - one cache node
//!
//! Serves the demo "scores" group backed by a slow in-memory database and
//! shares it with the nodes listed in `PEERS`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peer_cache::{create_router, AppState, Config, Getter, HttpPool, PoolOptions, Registry};

/// Stand-in for an expensive source of truth.
struct SlowDb {
    scores: HashMap<&'static str, &'static str>,
}

impl SlowDb {
    fn new() -> Self {
        Self {
            scores: HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]),
        }
    }
}

#[async_trait]
impl Getter for SlowDb {
    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        info!("[SlowDB] search key {}", key);
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.scores
            .get(key)
            .map(|v| v.as_bytes().to_vec())
            .ok_or_else(|| anyhow::anyhow!("{} not exist", key))
    }
}

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Register the demo group
/// 4. Attach the HTTP peer pool
/// 5. Start HTTP server with graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peer_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Peer Cache node");

    let config = Config::from_env();
    info!(
        "Configuration loaded: self={}, peers={:?}, cache_bytes={}, replicas={}, port={}",
        config.self_addr, config.peers, config.cache_bytes, config.replicas, config.server_port
    );

    let registry = Arc::new(Registry::new());
    let group = registry.new_group(&config.group_name, config.cache_bytes, SlowDb::new())?;

    let pool = Arc::new(HttpPool::with_options(
        config.self_addr.clone(),
        PoolOptions {
            replicas: config.replicas,
            ..PoolOptions::default()
        },
    ));
    pool.set_peers(&config.peers);
    group.register_peers(pool);
    info!("Group {} ready with {} peers", group.name(), config.peers.len());

    let app = create_router(AppState::new(registry));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;

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
