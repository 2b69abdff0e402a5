use async_trait::async_trait;
use std::time::Duration;

use crate::services::cache::client::{CacheClient, CacheError, CacheResult, WindowCount};

/// Valkey/Redis-backed cache client.
///
/// Only the operations the rate limiter needs are implemented.
#[derive(Clone)]
pub struct ValkeyClient {
    manager: redis::aio::ConnectionManager,
}

impl ValkeyClient {
    // Create a Valkey client from a URL like `redis://localhost:6379`
    pub async fn new(url: &str) -> Result<Self, CacheError> {
        let client =
            redis::Client::open(url).map_err(|e| CacheError::BackendConnection(e.to_string()))?;

        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| CacheError::BackendConnection(e.to_string()))?;

        Ok(Self { manager })
    }
}

#[async_trait]
impl CacheClient for ValkeyClient {
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    async fn incr_in_window(&self, key: &str, window: Duration) -> CacheResult<WindowCount> {
        let mut conn = self.manager.clone();

        // PX expects integer milliseconds. We clamp to at least 1 ms.
        let window_ms: u64 = u64::try_from(window.as_millis()).unwrap_or(u64::MAX).max(1);

        // MULTI
        //   SET key 0 NX PX <window>   -- opens the window only if absent
        //   INCR key
        //   PTTL key
        // EXEC
        let (count, pttl): (u64, i64) = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(key)
            .arg(0)
            .arg("NX")
            .arg("PX")
            .arg(window_ms)
            .ignore()
            .cmd("INCR")
            .arg(key)
            .cmd("PTTL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendCommand(e.to_string()))?;

        // PTTL: -1 no expiry, -2 missing. Neither should happen inside MULTI.
        let expires_in = u64::try_from(pttl)
            .map(Duration::from_millis)
            .map_err(|_| CacheError::InvalidValue(format!("unexpected PTTL {pttl} for {key}")))?;

        Ok(WindowCount { count, expires_in })
    }
}
