//! Cursor pagination over posts ordered by descending id.
//!
//! A cursor is the id of the last item on the previous page and acts as an
//! exclusive upper bound, so rows inserted later (higher ids) never shift pages
//! that were already handed out.

use crate::repos::{Post, PostStore, error::RepoResult};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Always within `1..=MAX_LIMIT`.
    pub limit: i64,
    /// `None` means start from the newest post.
    pub cursor: Option<i64>,
}

impl PageRequest {
    pub fn new(limit: i64, cursor: i64) -> Self {
        let limit = if limit <= 0 {
            DEFAULT_LIMIT
        } else {
            limit.min(MAX_LIMIT)
        };
        let cursor = (cursor > 0).then_some(cursor);

        Self { limit, cursor }
    }

    /// Build from raw query-string values. Anything unparsable falls back to the defaults.
    pub fn from_query(limit: Option<&str>, cursor: Option<&str>) -> Self {
        let limit = limit
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_LIMIT);
        let cursor = cursor
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0);

        Self::new(limit, cursor)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<Post>,
    pub has_more: bool,
    pub next_cursor: Option<i64>,
}

impl Page {
    /// Cut a `limit + 1` over-fetch down to one page.
    pub fn from_overfetch(mut rows: Vec<Post>, limit: i64) -> Self {
        let limit = usize::try_from(limit).unwrap_or(0);
        let has_more = rows.len() > limit;
        if has_more {
            rows.truncate(limit);
        }
        let next_cursor = if has_more {
            rows.last().map(|p| p.id)
        } else {
            None
        };

        Self {
            items: rows,
            has_more,
            next_cursor,
        }
    }
}

pub async fn query_page(store: &dyn PostStore, request: PageRequest) -> RepoResult<Page> {
    let rows = store.fetch_desc(request.cursor, request.limit + 1).await?;
    Ok(Page::from_overfetch(rows, request.limit))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::repos::{MemoryPostRepo, NewPost};

    fn post(id: i64) -> Post {
        Post {
            id,
            title: format!("post {id}"),
            nick: "nick".into(),
            content: "content".into(),
            created_at: Utc::now(),
        }
    }

    async fn seeded(n: usize) -> MemoryPostRepo {
        let repo = MemoryPostRepo::new();
        for i in 0..n {
            repo.insert(NewPost {
                title: format!("post {i}"),
                nick: "nick".into(),
                content: "content".into(),
                ip: String::new(),
            })
            .await
            .unwrap();
        }
        repo
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(PageRequest::new(1000, 0).limit, 50);
        assert_eq!(PageRequest::new(50, 0).limit, 50);
        assert_eq!(PageRequest::new(1, 0).limit, 1);
    }

    #[test]
    fn zero_or_negative_limit_uses_default() {
        assert_eq!(PageRequest::new(0, 0).limit, 20);
        assert_eq!(PageRequest::new(-7, 0).limit, 20);
    }

    #[test]
    fn non_positive_cursor_means_start() {
        assert_eq!(PageRequest::new(20, 0).cursor, None);
        assert_eq!(PageRequest::new(20, -3).cursor, None);
        assert_eq!(PageRequest::new(20, 42).cursor, Some(42));
    }

    #[test]
    fn query_values_fall_back_when_unparsable() {
        let req = PageRequest::from_query(Some("lots"), Some("abc"));
        assert_eq!(req, PageRequest::default());

        let req = PageRequest::from_query(None, None);
        assert_eq!(req, PageRequest::default());

        let req = PageRequest::from_query(Some("5"), Some("17"));
        assert_eq!(
            req,
            PageRequest {
                limit: 5,
                cursor: Some(17)
            }
        );
    }

    #[test]
    fn overfetch_sets_cursor_to_last_kept_item() {
        let rows = vec![post(9), post(8), post(7), post(6)];
        let page = Page::from_overfetch(rows, 3);
        assert_eq!(page.items.len(), 3);
        assert!(page.has_more);
        assert_eq!(page.next_cursor, Some(7));
    }

    #[test]
    fn short_fetch_is_last_page() {
        let page = Page::from_overfetch(vec![post(2), post(1)], 3);
        assert_eq!(page.items.len(), 2);
        assert!(!page.has_more);
        assert_eq!(page.next_cursor, None);
    }

    #[tokio::test]
    async fn two_pages_cover_twenty_five_posts() {
        let repo = seeded(25).await;

        let first = query_page(&repo, PageRequest::new(20, 0)).await.unwrap();
        assert_eq!(first.items.len(), 20);
        assert!(first.has_more);
        assert!(first.items.windows(2).all(|w| w[0].id > w[1].id));
        assert_eq!(first.next_cursor, Some(first.items[19].id));

        let cursor = first.next_cursor.unwrap();
        let second = query_page(&repo, PageRequest::new(20, cursor))
            .await
            .unwrap();
        assert_eq!(second.items.len(), 5);
        assert!(!second.has_more);
        assert_eq!(second.next_cursor, None);
        assert!(second.items.iter().all(|p| p.id < cursor));
    }

    #[tokio::test]
    async fn repeated_query_is_identical() {
        let repo = seeded(12).await;
        let req = PageRequest::new(5, 9);
        let a = query_page(&repo, req).await.unwrap();
        let b = query_page(&repo, req).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn newer_inserts_do_not_shift_older_pages() {
        let repo = seeded(10).await;
        let first = query_page(&repo, PageRequest::new(4, 0)).await.unwrap();
        let cursor = first.next_cursor.unwrap();
        let before = query_page(&repo, PageRequest::new(4, cursor))
            .await
            .unwrap();

        seeded_insert(&repo, 3).await;

        let after = query_page(&repo, PageRequest::new(4, cursor))
            .await
            .unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn cursor_for_missing_id_still_filters() {
        let repo = seeded(5).await;
        repo.delete_post(3).await.unwrap();

        let page = query_page(&repo, PageRequest::new(20, 3)).await.unwrap();
        let ids: Vec<i64> = page.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1]);

        let page = query_page(&repo, PageRequest::new(20, 1000)).await.unwrap();
        assert_eq!(page.items.len(), 4);
    }

    async fn seeded_insert(repo: &MemoryPostRepo, n: usize) {
        for _ in 0..n {
            repo.insert(NewPost {
                title: "late".into(),
                nick: "nick".into(),
                content: "content".into(),
                ip: String::new(),
            })
            .await
            .unwrap();
        }
    }
}
