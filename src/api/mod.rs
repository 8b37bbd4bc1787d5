//! API Module
//!
//! HTTP handlers and routing for a cache node.
//!
//! # Endpoints
//! - `GET /_peercache?group=..&key=..` - Peer fetch
//! - `GET /api/:group?key=..` - Frontend lookup
//! - `GET /stats/:group` - Group statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
