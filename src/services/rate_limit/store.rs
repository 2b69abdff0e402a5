use std::{future::Future, pin::Pin, time::Duration};

use crate::services::cache::CacheError;

/// Fixed-window quota: at most `max_requests` per `window` for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWindow {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for FixedWindow {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

/// Outcome of one counted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the current window closes.
    pub reset_after: Duration,
}

impl RateLimitDecision {
    pub fn from_count(policy: FixedWindow, count: u64, reset_after: Duration) -> Self {
        let limit = policy.max_requests;
        let used = u32::try_from(count).unwrap_or(u32::MAX);

        Self {
            allowed: used <= limit,
            limit,
            remaining: limit.saturating_sub(used),
            reset_after,
        }
    }
}

/// Rate limiter check:
/// - `Ok(decision)`: the request was counted
/// - `Err(_)`: backend failure (the middleware lets the request through)
pub trait RateLimiter: Send + Sync {
    // Count one request for `key` and report whether it fits in the current window.
    fn check<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<RateLimitDecision, RateLimitError>> + Send + 'a>>;

    fn policy(&self) -> FixedWindow;
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error(transparent)]
    Cache(#[from] CacheError),
}
