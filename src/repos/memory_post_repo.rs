//! In-process `PostStore` used for local development (`STORE_BACKEND=memory`) and tests.
//!
//! Ids come from a counter guarded by the same lock as the rows, so they are
//! strictly increasing in insertion order just like a `BIGSERIAL` column.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::repos::error::RepoResult;
use crate::repos::post_repo::{NewPost, Post, PostStore};

#[derive(Debug)]
struct StoredPost {
    post: Post,
    #[cfg_attr(not(test), allow(dead_code))]
    ip: String,
}

// Comments cannot be created through the API; only tests seed them.
#[derive(Debug)]
#[allow(dead_code)]
struct StoredComment {
    post_id: i64,
    nick: String,
    content: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    last_id: i64,
    // Kept in ascending id order (append only).
    posts: Vec<StoredPost>,
    comments: Vec<StoredComment>,
}

#[derive(Debug, Default)]
pub struct MemoryPostRepo {
    tables: Mutex<Tables>,
}

impl MemoryPostRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // A panic while holding the lock cannot leave a half-written row behind,
        // so the data is still consistent.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    pub fn add_comment(&self, post_id: i64, nick: &str, content: &str) {
        self.lock().comments.push(StoredComment {
            post_id,
            nick: nick.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        });
    }

    #[cfg(test)]
    pub fn comment_count(&self, post_id: i64) -> usize {
        self.lock()
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .count()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().posts.len()
    }

    #[cfg(test)]
    pub fn ip_of(&self, post_id: i64) -> Option<String> {
        self.lock()
            .posts
            .iter()
            .find(|p| p.post.id == post_id)
            .map(|p| p.ip.clone())
    }
}

#[async_trait]
impl PostStore for MemoryPostRepo {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, post: NewPost) -> RepoResult<Post> {
        let mut tables = self.lock();
        tables.last_id += 1;

        let created = Post {
            id: tables.last_id,
            title: post.title,
            nick: post.nick,
            content: post.content,
            created_at: Utc::now(),
        };
        tables.posts.push(StoredPost {
            post: created.clone(),
            ip: post.ip,
        });

        Ok(created)
    }

    async fn fetch_desc(&self, before: Option<i64>, take: i64) -> RepoResult<Vec<Post>> {
        let take = usize::try_from(take).unwrap_or(0);
        let tables = self.lock();

        let rows = tables
            .posts
            .iter()
            .rev()
            .filter(|p| before.is_none_or(|cursor| p.post.id < cursor))
            .take(take)
            .map(|p| p.post.clone())
            .collect();

        Ok(rows)
    }

    async fn delete_comments(&self, post_id: i64) -> RepoResult<u64> {
        let mut tables = self.lock();
        let before = tables.comments.len();
        tables.comments.retain(|c| c.post_id != post_id);
        Ok((before - tables.comments.len()) as u64)
    }

    async fn delete_post(&self, post_id: i64) -> RepoResult<bool> {
        let mut tables = self.lock();
        let before = tables.posts.len();
        tables.posts.retain(|p| p.post.id != post_id);
        Ok(tables.posts.len() < before)
    }
}
