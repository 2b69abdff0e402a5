/*
 * Responsibility
 * - posts persistence behind the PostStore capability (insert / descending fetch / admin delete)
 * - PostgreSQL adapter (PgPostRepo) using parameterized SQLx statements
 * - comments are deleted explicitly before their post (the FK has no CASCADE)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub nick: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Values for a new row. Callers pass already validated (trimmed) text.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub nick: String,
    pub content: String,
    pub ip: String,
}

#[async_trait]
pub trait PostStore: Send + Sync {
    // Store name for logs.
    fn backend_name(&self) -> &'static str;

    async fn insert(&self, post: NewPost) -> RepoResult<Post>;

    // Newest first. `before` is an exclusive upper bound on id.
    async fn fetch_desc(&self, before: Option<i64>, take: i64) -> RepoResult<Vec<Post>>;

    // Returns number of removed comments.
    async fn delete_comments(&self, post_id: i64) -> RepoResult<u64>;

    async fn delete_post(&self, post_id: i64) -> RepoResult<bool>;
}

#[derive(Clone, Debug)]
pub struct PgPostRepo {
    pool: PgPool,
}

impl PgPostRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Idempotent schema bootstrap, run once at startup.
    pub async fn ensure_schema(&self) -> RepoResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id BIGSERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                nick TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                ip TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        self.widen_legacy_ids().await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts (created_at DESC)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id BIGSERIAL PRIMARY KEY,
                post_id BIGINT NOT NULL REFERENCES posts (id),
                nick TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_comments_post_id ON comments (post_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Tables created with `SERIAL` keys hold INT4 ids, which do not decode as `i64`.
    /// Such columns are widened in place; BIGINT tables are left alone.
    async fn widen_legacy_ids(&self) -> RepoResult<()> {
        const ID_COLUMNS: [(&str, &str); 3] =
            [("posts", "id"), ("comments", "id"), ("comments", "post_id")];

        for (table, column) in ID_COLUMNS {
            let data_type: Option<String> = sqlx::query_scalar(
                r#"
                SELECT data_type::TEXT
                FROM information_schema.columns
                WHERE table_schema = current_schema()
                  AND table_name = $1
                  AND column_name = $2
                "#,
            )
            .bind(table)
            .bind(column)
            .fetch_optional(&self.pool)
            .await?;

            if data_type.as_deref() != Some("integer") {
                continue;
            }

            tracing::warn!(table, column, "widening legacy INT4 id column to BIGINT");
            sqlx::query(&format!("ALTER TABLE {table} ALTER COLUMN {column} TYPE BIGINT"))
                .execute(&self.pool)
                .await?;

            if column == "id" {
                sqlx::query(&format!("ALTER SEQUENCE IF EXISTS {table}_id_seq AS BIGINT"))
                    .execute(&self.pool)
                    .await?;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl PostStore for PgPostRepo {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, post: NewPost) -> RepoResult<Post> {
        let row = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, nick, content, ip)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, nick, content, created_at
            "#,
        )
        .bind(&post.title)
        .bind(&post.nick)
        .bind(&post.content)
        .bind(&post.ip)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn fetch_desc(&self, before: Option<i64>, take: i64) -> RepoResult<Vec<Post>> {
        let rows = match before {
            Some(cursor) => {
                sqlx::query_as::<_, Post>(
                    r#"
                    SELECT id, title, nick, content, created_at
                    FROM posts
                    WHERE id < $1
                    ORDER BY id DESC
                    LIMIT $2
                    "#,
                )
                .bind(cursor)
                .bind(take)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Post>(
                    r#"
                    SELECT id, title, nick, content, created_at
                    FROM posts
                    ORDER BY id DESC
                    LIMIT $1
                    "#,
                )
                .bind(take)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows)
    }

    async fn delete_comments(&self, post_id: i64) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE post_id = $1
            "#,
        )
        .bind(post_id)
        .execute(&self.pool)
        .await
        .map_err(RepoError::Db)?;

        Ok(result.rows_affected())
    }

    async fn delete_post(&self, post_id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .execute(&self.pool)
        .await
        .map_err(RepoError::Db)?;

        Ok(result.rows_affected() > 0)
    }
}
