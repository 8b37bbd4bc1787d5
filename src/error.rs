//! Error types for the peer cache
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type returned by group lookups and the peer endpoint.
///
/// Cloneable so that one coalesced result can be handed to every waiter.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Lookup was made with an empty key
    #[error("key is required")]
    EmptyKey,

    /// No group registered under this name
    #[error("no such group: {0}")]
    GroupNotFound(String),

    /// A group with this name is already registered
    #[error("group already exists: {0}")]
    GroupExists(String),

    /// The user loader failed; the message is passed through verbatim
    #[error("{0}")]
    Load(Arc<anyhow::Error>),

    /// Internal failure (panicked computation, encoding error)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for CacheError {
    fn from(err: anyhow::Error) -> Self {
        CacheError::Load(Arc::new(err))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::EmptyKey => StatusCode::BAD_REQUEST,
            CacheError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::GroupExists(_) => StatusCode::CONFLICT,
            CacheError::Load(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Peer Error Enum ==
/// Failure of a remote fetch. Callers treat every variant the same way:
/// fall back to loading locally.
#[derive(Error, Debug)]
pub enum PeerError {
    /// Connection, timeout or body read failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Peer answered with a non-success status
    #[error("peer returned {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },

    /// Response body was not a valid fetch payload
    #[error("decoding response body: {0}")]
    Decode(#[from] bincode::Error),

    /// An in-process peer failed to serve the key
    #[error("peer failed: {0}")]
    Remote(String),
}

// == Result Type Alias ==
/// Convenience Result type for the peer cache.
pub type Result<T> = std::result::Result<T, CacheError>;
