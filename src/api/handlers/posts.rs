/*
 * Responsibility
 * - GET /posts  (cursor pagination)
 * - POST /posts (validate -> insert; rate limit is applied by middleware before this runs)
 * - Body/query parsing and DTO mapping only; rules live in services::posts
 */
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};

use crate::{
    api::{
        dto::posts::{CreatePostRequest, ListPostsQuery, PostPageResponse, PostResponse},
        extractors::ClientIp,
    },
    error::AppError,
    services::{pagination::PageRequest, posts},
    state::AppState,
};

pub async fn list_posts(
    State(state): State<AppState>,
    query: Result<Query<ListPostsQuery>, QueryRejection>,
) -> Result<Json<PostPageResponse>, AppError> {
    // An unparseable query string (e.g. a repeated key) reads as "no parameters".
    let request = match query {
        Ok(Query(query)) => {
            PageRequest::from_query(query.limit.as_deref(), query.cursor.as_deref())
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "ignoring unreadable query string");
            PageRequest::default()
        }
    };
    let page = posts::list(state.posts.as_ref(), request).await?;

    Ok(Json(page.into()))
}

pub async fn create_post(
    State(state): State<AppState>,
    client_ip: ClientIp,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "unreadable post body");
        AppError::bad_request("request body must be a JSON object")
    })?;

    let row = posts::create(state.posts.as_ref(), req.into(), client_ip.into_inner()).await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}
