/*
 * Responsibility
 * - App-wide ApiError definition
 * - IntoResponse impl (HTTP status + `{ "error": message }` body)
 * - Converts service/repo errors in one place; storage details are logged, not returned
 */
use std::time::Duration;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::{admin::AdminError, posts::PostServiceError, validation::ValidationError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    BadRequest(String),
    #[error("invalid password")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("too many requests, try again later")]
    TooManyRequests { retry_after: Duration },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
        };

        let mut res = (status, Json(body)).into_response();
        if let AppError::TooManyRequests { retry_after } = self {
            // Round up so clients never retry inside the window.
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            res.headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        res
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Db(err) => {
                tracing::error!(error = ?err, "storage failure");
                AppError::Internal
            }
        }
    }
}

impl From<PostServiceError> for AppError {
    fn from(e: PostServiceError) -> Self {
        match e {
            PostServiceError::Validation(v) => AppError::Validation(v),
            PostServiceError::Repo(r) => r.into(),
        }
    }
}

impl From<AdminError> for AppError {
    fn from(e: AdminError) -> Self {
        match e {
            AdminError::InvalidPassword => AppError::Forbidden,
            AdminError::PostNotFound(_) => AppError::NotFound("post"),
            AdminError::Repo(r) => r.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(res: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_is_400_with_message() {
        let err = AppError::from(ValidationError::TooLong {
            field: "title",
            max: 80,
        });
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_of(res).await["error"],
            "title must be at most 80 characters"
        );
    }

    #[tokio::test]
    async fn storage_error_hides_details() {
        let err = AppError::from(RepoError::Db(sqlx::Error::PoolTimedOut));
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(res).await["error"], "internal server error");
    }

    #[test]
    fn admin_errors_map_to_statuses() {
        assert_eq!(
            AppError::from(AdminError::InvalidPassword).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(AdminError::PostNotFound(3)).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn retry_after_rounds_up() {
        let res = AppError::TooManyRequests {
            retry_after: Duration::from_millis(1500),
        }
        .into_response();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(res.headers()[header::RETRY_AFTER], "2");
    }
}
