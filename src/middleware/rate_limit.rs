//! Fixed-window quotas.
//!
//! - `POST /api/posts`: creation quota. A rejected request gets `429` before the
//!   body is read, so validation and storage are never reached.
//! - `POST /api/deletePost`: separate bucket that throttles password guessing.
//!
//! The key is the client address as seen through the configured number of
//! trusted proxies, never the client-supplied first `X-Forwarded-For` hop.
//!
//! Responses carry `RateLimit-Limit`, `RateLimit-Remaining` and `RateLimit-Reset`
//! (seconds). When the limiter backend fails the request is let through and
//! the failure is logged.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::extractors::{QuotaKey, peer_addr};
use crate::error::AppError;
use crate::services::rate_limit::RateLimitDecision;
use crate::state::AppState;

const LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

pub async fn enforce_create(state: State<AppState>, request: Request, next: Next) -> Response {
    enforce("create", state, request, next).await
}

pub async fn enforce_admin(state: State<AppState>, request: Request, next: Next) -> Response {
    enforce("admin", state, request, next).await
}

async fn enforce(
    scope: &'static str,
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let QuotaKey(client) = QuotaKey::derive(
        request.headers(),
        peer_addr(request.extensions()),
        state.trusted_proxy_hops,
    );
    let client = if client.is_empty() {
        "unknown".to_string()
    } else {
        client
    };
    let key = format!("{scope}:{client}");

    match state.limiter.check(&key).await {
        Ok(decision) if !decision.allowed => {
            tracing::warn!(scope, client = %client, "rate limit exceeded");
            let mut res = AppError::TooManyRequests {
                retry_after: decision.reset_after,
            }
            .into_response();
            write_headers(res.headers_mut(), &decision);
            res
        }
        Ok(decision) => {
            let mut res = next.run(request).await;
            write_headers(res.headers_mut(), &decision);
            res
        }
        Err(e) => {
            tracing::error!(scope, error = %e, "rate limiter unavailable, failing open");
            next.run(request).await
        }
    }
}

fn write_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    let reset = decision.reset_after;
    let reset_secs = reset.as_secs() + u64::from(reset.subsec_nanos() > 0);

    headers.insert(LIMIT, HeaderValue::from(decision.limit));
    headers.insert(REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(RESET, HeaderValue::from(reset_secs));
}
