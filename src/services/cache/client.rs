//! Cache client interface used by higher-level services (rate-limit counters for now).
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (transport/command/value).
///
/// Kept independent from `AppError` so callers decide how to fail
/// (the rate limiter fails open, for example).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
    #[error("cache value error: {0}")]
    InvalidValue(String),
}

/// Snapshot of a windowed counter after one increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCount {
    pub count: u64,
    /// Time until the key expires and the count starts over.
    pub expires_in: Duration,
}

/// A minimal cache interface.
///
/// Implementations must be cheap to clone (typically `Arc<...>` inside).
#[async_trait]
pub trait CacheClient: Clone + Send + Sync + 'static {
    // Returns the cache backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Increment `key`. The first increment starts a TTL of `window`;
    // later increments leave the TTL alone (fixed window).
    async fn incr_in_window(&self, key: &str, window: Duration) -> CacheResult<WindowCount>;
}
