/*
 * Responsibility
 * - GET /health (liveness; does not touch the store)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"ok": true})))
}
