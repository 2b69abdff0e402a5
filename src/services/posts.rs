/*
 * Responsibility
 * - Write path: validate -> insert -> return the created row
 * - Read path: delegate to the pagination engine
 * - Handlers call these with the store taken from AppState
 */
use thiserror::Error;

use crate::repos::{NewPost, Post, PostStore, RepoError};
use crate::services::pagination::{self, Page, PageRequest};
use crate::services::validation::{self, ValidationError};

#[derive(Debug, Error)]
pub enum PostServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Raw, untrimmed fields as received from the client.
#[derive(Debug, Clone, Default)]
pub struct CreatePostInput {
    pub title: Option<String>,
    pub nick: Option<String>,
    pub content: Option<String>,
}

pub async fn create(
    store: &dyn PostStore,
    input: CreatePostInput,
    ip: String,
) -> Result<Post, PostServiceError> {
    let valid = validation::validate(
        input.title.as_deref(),
        input.nick.as_deref(),
        input.content.as_deref(),
    )?;

    let post = store
        .insert(NewPost {
            title: valid.title,
            nick: valid.nick,
            content: valid.content,
            ip,
        })
        .await?;

    tracing::debug!(post_id = post.id, backend = store.backend_name(), "post created");
    Ok(post)
}

pub async fn list(store: &dyn PostStore, request: PageRequest) -> Result<Page, PostServiceError> {
    Ok(pagination::query_page(store, request).await?)
}
