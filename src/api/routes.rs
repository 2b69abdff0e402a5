/*
 * Responsibility
 * - URL structure under /api
 * - quotas are route-scoped: creation on POST /posts, password attempts on POST /deletePost
 * - JSON 405 for known paths with an unsupported method
 */
use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::api::handlers::{
    admin::delete_post,
    health::health,
    method_not_allowed,
    posts::{create_post, list_posts},
};
use crate::middleware::rate_limit;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let create = post(create_post).route_layer(middleware::from_fn_with_state(
        state.clone(),
        rate_limit::enforce_create,
    ));
    let admin_delete = post(delete_post).route_layer(middleware::from_fn_with_state(
        state,
        rate_limit::enforce_admin,
    ));

    Router::new()
        .route("/health", get(health))
        .route("/posts", get(list_posts).merge(create))
        .route("/deletePost", admin_delete)
        // Must come after the routes: it is installed on each registered path.
        .method_not_allowed_fallback(method_not_allowed)
}
