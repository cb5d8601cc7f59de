//! API Handlers
//!
//! HTTP request handlers for each cache endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{NoLock, ShardedCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    GetResponse, HealthResponse, IncrResponse, SetRequest, SetResponse, StatsResponse,
    TtlResponse,
};

/// Application state shared across all handlers.
///
/// The cache does its own locking, so handlers share it through a plain Arc.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache instance
    pub cache: Arc<ShardedCache>,
    /// TTL applied to sets that carry none
    pub default_ttl: Duration,
}

impl AppState {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: ShardedCache, default_ttl: Duration) -> Self {
        Self {
            cache: Arc::new(cache),
            default_ttl,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the cache and starts its sweeper; must run inside a tokio runtime.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = ShardedCache::from_config(config)?;
        Ok(Self::new(cache, config.default_ttl()))
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair in the cache with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl.map(Duration::from_secs).unwrap_or(state.default_ttl);
    state.cache.set(&req.key, req.value.into_bytes(), ttl).await?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state.cache.get(&key).await?;
    let value = String::from_utf8_lossy(&value).into_owned();

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for POST /incr/:key
///
/// Increments an integer value in place, keeping its remaining TTL. The read
/// and the write happen under one entry lock, so concurrent increments are
/// never lost.
pub async fn incr_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<IncrResponse>> {
    let value = state
        .cache
        .safe_operate(&key, |view| increment(view, &key))
        .await?;

    Ok(Json(IncrResponse::new(key, value)))
}

fn increment(view: &mut NoLock<'_>, key: &str) -> Result<i64> {
    let current = parse_integer(&view.nl_get(key)?)?;
    let next = current
        .checked_add(1)
        .ok_or_else(|| CacheError::InvalidRequest("increment would overflow".to_string()))?;

    let ttl = match view.nl_ttl(key) {
        Ok(ms) => Duration::from_millis(ms),
        Err(CacheError::NoExpireTime(_)) => Duration::MAX,
        Err(e) => return Err(e),
    };
    view.nl_set(key, next.to_string().into_bytes(), ttl)?;

    Ok(next)
}

fn parse_integer(bytes: &[u8]) -> Result<i64> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| CacheError::InvalidRequest("value is not an integer".to_string()))
}

/// Handler for GET /ttl/:key
///
/// Returns the remaining lifetime in milliseconds, or null for keys that
/// never expire.
pub async fn ttl_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<TtlResponse>> {
    let ttl_ms = state
        .cache
        .safe_operate(&key, |view| match view.nl_ttl(&key) {
            Ok(ms) => Ok(Some(ms)),
            Err(CacheError::NoExpireTime(_)) => Ok(None),
            Err(e) => Err(e),
        })
        .await?;

    Ok(Json(TtlResponse::new(key, ttl_ms)))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    Json(StatsResponse::new(&stats, state.cache.bucket_depth()))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
