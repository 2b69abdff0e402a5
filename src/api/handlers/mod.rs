pub mod admin;
pub mod health;
pub mod posts;

use crate::error::AppError;

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

pub async fn not_found() -> AppError {
    AppError::NotFound("route")
}
