//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of buckets (shards), fixed for the cache lifetime
    pub bucket_depth: usize,
    /// Default TTL in seconds for HTTP sets without explicit TTL
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background sweeper interval in milliseconds
    pub sweep_interval_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `BUCKET_DEPTH` - Number of buckets (default: 64)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL_MS` - Sweeper period in milliseconds (default: 1000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bucket_depth: parse_env("BUCKET_DEPTH").unwrap_or(defaults.bucket_depth),
            default_ttl: parse_env("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
            sweep_interval_ms: parse_env("SWEEP_INTERVAL_MS")
                .unwrap_or(defaults.sweep_interval_ms),
        }
    }

    /// Sweeper period as a Duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    /// Default TTL as a Duration.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket_depth: 64,
            default_ttl: 300,
            server_port: 3000,
            sweep_interval_ms: 1000,
        }
    }
}
