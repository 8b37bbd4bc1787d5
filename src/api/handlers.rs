//! API Handlers
//!
//! HTTP request handlers for the peer endpoint, the frontend lookup and
//! the observability endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::cache::ByteView;
use crate::error::{CacheError, Result};
use crate::group::Registry;
use crate::models::{ApiQuery, FetchRequest, FetchResponse, HealthResponse, StatsResponse};
use crate::peers::DEFAULT_BASE_PATH;

const OCTET_STREAM: &str = "application/octet-stream";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Groups served by this node
    pub registry: Arc<Registry>,
    /// Path the peer endpoint is mounted at
    pub base_path: String,
}

impl AppState {
    /// Serves `registry` with the peer endpoint at [`DEFAULT_BASE_PATH`].
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            base_path: DEFAULT_BASE_PATH.to_string(),
        }
    }

    /// Mounts the peer endpoint somewhere else. Must match the
    /// `base_path` the peers' pools were built with.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }
}

// == Serve Fetch ==
/// Answers one peer fetch independent of any web framework.
///
/// Fails with [`CacheError::GroupNotFound`] for an unknown group, otherwise
/// behaves exactly like [`crate::group::Group::get`].
pub async fn serve_fetch(registry: &Registry, group: &str, key: &str) -> Result<ByteView> {
    let group = registry
        .get_group(group)
        .ok_or_else(|| CacheError::GroupNotFound(group.to_string()))?;

    group.get(key).await
}

/// Handler for GET {base_path}?group=..&key=..
///
/// Peer endpoint. Replies with the bincode encoded [`FetchResponse`].
pub async fn fetch_handler(
    State(state): State<AppState>,
    Query(req): Query<FetchRequest>,
) -> Result<Response> {
    debug!("Peer fetch for key {} in group {}", req.key, req.group);

    let value = serve_fetch(&state.registry, &req.group, &req.key).await?;
    let body = FetchResponse::from(&value)
        .encode()
        .map_err(|e| CacheError::Internal(format!("encoding fetch response: {}", e)))?;

    Ok(([(header::CONTENT_TYPE, OCTET_STREAM)], body).into_response())
}

/// Handler for GET /api/:group?key=..
///
/// Frontend lookup returning the raw value bytes.
pub async fn api_handler(
    State(state): State<AppState>,
    Path(group): Path<String>,
    Query(query): Query<ApiQuery>,
) -> Result<Response> {
    let value = serve_fetch(&state.registry, &group, &query.key).await?;

    Ok(([(header::CONTENT_TYPE, OCTET_STREAM)], value.byte_slice()).into_response())
}

/// Handler for GET /stats/:group
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Result<Json<StatsResponse>> {
    let found = state
        .registry
        .get_group(&group)
        .ok_or_else(|| CacheError::GroupNotFound(group.clone()))?;

    Ok(Json(StatsResponse::new(
        group,
        found.stats(),
        found.cache_stats(),
    )))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        let registry = Arc::new(Registry::new());
        registry
            .new_group("scores", 2 << 10, |key: String| async move {
                match key.as_str() {
                    "Tom" => Ok(b"630".to_vec()),
                    _ => Err(anyhow::anyhow!("{} not exist", key)),
                }
            })
            .unwrap();
        AppState::new(registry)
    }

    #[tokio::test]
    async fn test_serve_fetch_known_key() {
        let state = test_state();

        let value = serve_fetch(&state.registry, "scores", "Tom").await.unwrap();

        assert_eq!(value.as_string(), "630");
    }

    #[tokio::test]
    async fn test_serve_fetch_unknown_group() {
        let state = test_state();

        let err = serve_fetch(&state.registry, "nope", "Tom").await.unwrap_err();

        assert!(matches!(err, CacheError::GroupNotFound(name) if name == "nope"));
    }

    #[tokio::test]
    async fn test_serve_fetch_loader_error() {
        let state = test_state();

        let err = serve_fetch(&state.registry, "scores", "kkk").await.unwrap_err();

        assert_eq!(err.to_string(), "kkk not exist");
    }

    #[tokio::test]
    async fn test_stats_handler_counts_lookups() {
        let state = test_state();
        serve_fetch(&state.registry, "scores", "Tom").await.unwrap();
        serve_fetch(&state.registry, "scores", "Tom").await.unwrap();

        let response = stats_handler(State(state), Path("scores".to_string()))
            .await
            .unwrap();

        assert_eq!(response.group_stats.gets, 2);
        assert_eq!(response.group_stats.cache_hits, 1);
        assert_eq!(response.cache_stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_stats_handler_unknown_group() {
        let state = test_state();

        let result = stats_handler(State(state), Path("nope".to_string())).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[test]
    fn test_custom_base_path() {
        let state = test_state().with_base_path("/internal");
        assert_eq!(state.base_path, "/internal");
    }
}
