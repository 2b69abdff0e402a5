/*
 * Responsibility
 * - POST /deletePost { postId, password }
 * - Password check and comment->post deletion order live in services::admin
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    api::dto::admin::{DeletePostRequest, DeletePostResponse},
    error::AppError,
    services::admin,
    state::AppState,
};

pub async fn delete_post(
    State(state): State<AppState>,
    payload: Result<Json<DeletePostRequest>, JsonRejection>,
) -> Result<Json<DeletePostResponse>, AppError> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "unreadable delete body");
        AppError::bad_request("postId is required")
    })?;

    admin::delete_post(
        state.posts.as_ref(),
        &state.admin,
        req.post_id,
        &req.password,
    )
    .await?;

    Ok(Json(DeletePostResponse { success: true }))
}
