//! Error types for the sharded cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache engine and its HTTP surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The target bucket's storage was never initialized
    #[error("cache is invalid")]
    BadCache,

    /// Key absent, or present but expired
    #[error("key is not found in cache: {0}")]
    RecordNotFound(String),

    /// Routing produced an index outside the bucket range
    #[error("bucket hash is wrong: index {index} out of {depth} buckets")]
    WrongBucketHash { index: usize, depth: usize },

    /// Key has no recorded expiration
    #[error("key has no expiration: {0}")]
    NoExpireTime(String),

    /// Bucket depth must be positive
    #[error("invalid bucket depth: {0}")]
    InvalidDepth(usize),

    /// Cache constructed outside a tokio runtime
    #[error("no tokio runtime available to run the sweeper")]
    NoRuntime,

    /// No-lock access to a key other than the one held by `safe_operate`
    #[error("key is not locked by this operation: {0}")]
    NotLocked(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::RecordNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
