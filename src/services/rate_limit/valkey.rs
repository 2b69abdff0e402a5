use std::{future::Future, pin::Pin, sync::Arc};

use crate::services::{
    cache::{CacheClient, ValkeyClient},
    rate_limit::store::{FixedWindow, RateLimitDecision, RateLimitError, RateLimiter},
};

/// Valkey-backed fixed-window limiter (Redis protocol), shared by every replica.
#[derive(Clone)]
pub struct ValkeyRateLimiter<C: CacheClient> {
    cache: Arc<C>,
    policy: FixedWindow,
    // Optional key prefix to avoid collisions across environments
    prefix: String,
}

impl ValkeyRateLimiter<ValkeyClient> {
    pub async fn new(valkey_url: &str, policy: FixedWindow) -> Result<Self, RateLimitError> {
        let client = ValkeyClient::new(valkey_url).await?;
        tracing::info!(backend = client.backend_name(), "rate limit counters are shared");
        Ok(Self::new_with_cache(
            Arc::new(client),
            policy,
            "board:ratelimit",
        ))
    }
}

impl<C: CacheClient> ValkeyRateLimiter<C> {
    pub fn new_with_cache(cache: Arc<C>, policy: FixedWindow, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            policy,
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, raw: &str) -> String {
        format!("{}:{}", self.prefix, raw)
    }
}

impl<C: CacheClient> RateLimiter for ValkeyRateLimiter<C> {
    fn check<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<RateLimitDecision, RateLimitError>> + Send + 'a>> {
        Box::pin(async move {
            let full_key = self.key(key);
            let counted = self
                .cache
                .incr_in_window(&full_key, self.policy.window)
                .await?;

            Ok(RateLimitDecision::from_count(
                self.policy,
                counted.count,
                counted.expires_in,
            ))
        })
    }

    fn policy(&self) -> FixedWindow {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::services::cache::{CacheError, WindowCount, client::CacheResult};

    #[derive(Clone, Default)]
    struct FakeCache {
        counts: Arc<Mutex<HashMap<String, u64>>>,
    }

    #[async_trait]
    impl CacheClient for FakeCache {
        fn backend_name(&self) -> &'static str {
            "fake"
        }

        async fn incr_in_window(&self, key: &str, window: Duration) -> CacheResult<WindowCount> {
            if key.ends_with("broken") {
                return Err(CacheError::BackendCommand("down".into()));
            }
            let mut counts = self.counts.lock().unwrap();
            let count = counts.entry(key.to_string()).or_insert(0);
            *count += 1;
            Ok(WindowCount {
                count: *count,
                expires_in: window,
            })
        }
    }

    #[tokio::test]
    async fn counts_under_prefixed_key() {
        let cache = Arc::new(FakeCache::default());
        let policy = FixedWindow {
            max_requests: 2,
            window: Duration::from_secs(60),
        };
        let limiter = ValkeyRateLimiter::new_with_cache(cache.clone(), policy, "test");

        assert!(limiter.check("ip").await.unwrap().allowed);
        assert!(limiter.check("ip").await.unwrap().allowed);
        assert!(!limiter.check("ip").await.unwrap().allowed);
        assert_eq!(cache.counts.lock().unwrap().get("test:ip"), Some(&3));
    }

    #[tokio::test]
    async fn backend_failure_is_an_error() {
        let limiter = ValkeyRateLimiter::new_with_cache(
            Arc::new(FakeCache::default()),
            FixedWindow::default(),
            "test",
        );
        assert!(limiter.check("broken").await.is_err());
    }
}
