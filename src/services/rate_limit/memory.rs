//! In-process fixed-window counters.
//!
//! Limits are per-process, not shared across instances. Use the Valkey
//! limiter when more than one replica serves traffic.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Instant;

use crate::services::rate_limit::store::{
    FixedWindow, RateLimitDecision, RateLimitError, RateLimiter,
};

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u64,
}

#[derive(Debug)]
struct Windows {
    by_key: HashMap<String, Window>,
    // Expired keys are dropped at most once per window length.
    last_sweep: Instant,
}

#[derive(Debug)]
pub struct MemoryRateLimiter {
    policy: FixedWindow,
    windows: Mutex<Windows>,
}

impl MemoryRateLimiter {
    pub fn new(policy: FixedWindow) -> Self {
        Self {
            policy,
            windows: Mutex::new(Windows {
                by_key: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    fn hit_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let window = self.policy.window;
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if now.saturating_duration_since(windows.last_sweep) >= window {
            windows
                .by_key
                .retain(|_, w| now.saturating_duration_since(w.started) < window);
            windows.last_sweep = now;
        }

        let entry = windows.by_key.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.saturating_duration_since(entry.started) >= window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }
        entry.count += 1;

        let reset_after = window.saturating_sub(now.saturating_duration_since(entry.started));
        RateLimitDecision::from_count(self.policy, entry.count, reset_after)
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .by_key
            .len()
    }
}

impl RateLimiter for MemoryRateLimiter {
    fn check<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<RateLimitDecision, RateLimitError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.hit_at(key, Instant::now())) })
    }

    fn policy(&self) -> FixedWindow {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn limiter() -> MemoryRateLimiter {
        MemoryRateLimiter::new(FixedWindow {
            max_requests: 10,
            window: Duration::from_secs(60),
        })
    }

    #[test]
    fn eleventh_request_in_window_is_rejected() {
        let limiter = limiter();
        let now = Instant::now();

        for n in 1..=10 {
            let d = limiter.hit_at("1.2.3.4", now);
            assert!(d.allowed, "request {n} should pass");
            assert_eq!(d.remaining, 10 - n);
        }
        let d = limiter.hit_at("1.2.3.4", now + Duration::from_secs(59));
        assert!(!d.allowed);
        assert_eq!(d.reset_after, Duration::from_secs(1));
    }

    #[test]
    fn keys_are_counted_separately() {
        let limiter = limiter();
        let now = Instant::now();
        for _ in 0..10 {
            limiter.hit_at("a", now);
        }
        assert!(!limiter.hit_at("a", now).allowed);
        assert!(limiter.hit_at("b", now).allowed);
    }

    #[test]
    fn window_resets_after_it_elapses() {
        let limiter = limiter();
        let now = Instant::now();
        for _ in 0..11 {
            limiter.hit_at("a", now);
        }
        let later = now + Duration::from_secs(60);
        let d = limiter.hit_at("a", later);
        assert!(d.allowed);
        assert_eq!(d.remaining, 9);
        assert_eq!(d.reset_after, Duration::from_secs(60));
    }

    #[test]
    fn expired_keys_are_swept_once_a_window_has_passed() {
        let limiter = limiter();
        let now = Instant::now();
        for n in 0..100 {
            limiter.hit_at(&format!("10.0.0.{n}"), now);
        }
        assert_eq!(limiter.tracked_keys(), 100);

        // Within the window nothing is dropped.
        limiter.hit_at("late", now + Duration::from_secs(30));
        assert_eq!(limiter.tracked_keys(), 101);

        // Next sweep keeps only keys whose window is still open.
        limiter.hit_at("fresh", now + Duration::from_secs(61));
        assert_eq!(limiter.tracked_keys(), 2);
        // A surviving key keeps its count.
        assert_eq!(limiter.hit_at("late", now + Duration::from_secs(62)).remaining, 8);
    }

    #[tokio::test]
    async fn check_counts_through_the_trait() {
        let limiter = limiter();
        let d = limiter.check("k").await.unwrap();
        assert!(d.allowed);
        assert_eq!(d.limit, 10);
        assert_eq!(limiter.policy().max_requests, 10);
    }
}
