/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - posts: PostStore adapter (owns the PgPool), limiter, admin gate
 *   - trusted_proxy_hops: how many X-Forwarded-For hops the rate limiter may trust
 * - Built once in app::build_state and cloned per request (everything inside is Arc/cheap)
 */
use std::sync::Arc;

use crate::repos::PostStore;
use crate::services::{admin::AdminGate, rate_limit::RateLimiter};

#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostStore>,
    pub limiter: Arc<dyn RateLimiter>,
    pub admin: AdminGate,
    pub trusted_proxy_hops: usize,
}

impl AppState {
    pub fn new(
        posts: Arc<dyn PostStore>,
        limiter: Arc<dyn RateLimiter>,
        admin: AdminGate,
        trusted_proxy_hops: usize,
    ) -> Self {
        Self {
            posts,
            limiter,
            admin,
            trusted_proxy_hops,
        }
    }
}
