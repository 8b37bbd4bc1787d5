//! API Routes
//!
//! Configures the Axum router with all node endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{api_handler, fetch_handler, health_handler, stats_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET {base_path}?group=..&key=..` - Peer fetch (bincode body)
/// - `GET /api/:group?key=..` - Frontend lookup (raw bytes)
/// - `GET /stats/:group` - Group statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let base_path = state.base_path.clone();

    Router::new()
        .route(&base_path, get(fetch_handler))
        .route("/api/:group", get(api_handler))
        .route("/stats/:group", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Registry;
    use crate::models::FetchResponse;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let registry = Arc::new(Registry::new());
        registry
            .new_group("scores", 2 << 10, |key: String| async move {
                match key.as_str() {
                    "Tom" => Ok(b"630".to_vec()),
                    _ => Err(anyhow::anyhow!("{} not exist", key)),
                }
            })
            .unwrap();
        create_router(AppState::new(registry))
    }

    async fn get_request(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = get_request(create_test_app(), "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_peer_endpoint_returns_encoded_value() {
        let response = get_request(create_test_app(), "/_peercache?group=scores&key=Tom").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "application/octet-stream"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(FetchResponse::decode(&body).unwrap().value, b"630".to_vec());
    }

    #[tokio::test]
    async fn test_peer_endpoint_unknown_group() {
        let response = get_request(create_test_app(), "/_peercache?group=nope&key=Tom").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_peer_endpoint_missing_params() {
        let response = get_request(create_test_app(), "/_peercache?group=scores").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_api_endpoint_raw_value() {
        let response = get_request(create_test_app(), "/api/scores?key=Tom").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"630");
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let response = get_request(create_test_app(), "/stats/scores").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_custom_base_path_is_mounted() {
        let registry = Arc::new(Registry::new());
        registry
            .new_group("echo", 0, |key: String| async move {
                Ok::<_, anyhow::Error>(key.into_bytes())
            })
            .unwrap();
        let app = create_router(AppState::new(registry).with_base_path("/internal/cache"));

        let response = get_request(app, "/internal/cache?group=echo&key=hi").await;

        assert_eq!(response.status(), StatusCode::OK);
    }
}
