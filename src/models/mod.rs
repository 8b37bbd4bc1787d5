//! Wire models for the peer protocol and the HTTP API
//!
//! This module defines the messages exchanged between cache nodes and the
//! JSON bodies served to operators.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ApiQuery, FetchRequest};
pub use responses::{ErrorResponse, FetchResponse, HealthResponse, StatsResponse};
