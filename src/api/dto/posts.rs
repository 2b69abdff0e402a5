/*
 * Responsibility
 * - Posts request/response DTO
 * - ip is stored but never part of a response
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repos::Post;
use crate::services::pagination::Page;
use crate::services::posts::CreatePostInput;

// Fields stay optional so a missing one surfaces as a validation error, not a JSON error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub nick: Option<String>,
    pub content: Option<String>,
}

impl From<CreatePostRequest> for CreatePostInput {
    fn from(req: CreatePostRequest) -> Self {
        Self {
            title: req.title,
            nick: req.nick,
            content: req.content,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    // Raw strings: unparsable values fall back to defaults instead of a 400.
    pub limit: Option<String>,
    pub cursor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub nick: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(row: Post) -> Self {
        Self {
            id: row.id,
            title: row.title,
            nick: row.nick,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostPageResponse {
    pub items: Vec<PostResponse>,
    #[serde(rename = "nextCursor")]
    pub next_cursor: Option<i64>,
}

impl From<Page> for PostPageResponse {
    fn from(page: Page) -> Self {
        Self {
            items: page.items.into_iter().map(PostResponse::from).collect(),
            next_cursor: page.next_cursor,
        }
    }
}
