//! API Module
//!
//! HTTP handlers and routing that expose a cache instance.
//!
//! # Endpoints
//! - `PUT /set` - Store a key-value pair
//! - `GET /get/:key` - Retrieve a value by key
//! - `POST /incr/:key` - Atomically increment an integer value
//! - `GET /ttl/:key` - Remaining lifetime of a key
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
