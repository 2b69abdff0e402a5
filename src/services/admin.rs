/*
 * Responsibility
 * - Admin password check against the server-held secret
 * - Post deletion: comments first, then the post
 *
 * The two deletes are separate statements. If the second one fails the
 * comments are already gone; that state is logged and reported, never retried.
 */
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::repos::{PostStore, RepoError};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("invalid password")]
    InvalidPassword,
    #[error("post {0} not found")]
    PostNotFound(i64),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Holds only a digest of the admin secret. Comparing fixed-size digests keeps
/// the check independent of where the first mismatching byte is.
#[derive(Clone)]
pub struct AdminGate {
    secret_digest: Option<[u8; 32]>,
}

impl AdminGate {
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            secret_digest: secret.map(digest),
        }
    }

    /// Unconfigured secret rejects everything.
    pub fn verify(&self, password: &str) -> Result<(), AdminError> {
        let Some(expected) = &self.secret_digest else {
            return Err(AdminError::InvalidPassword);
        };

        let given = digest(password);
        let diff = expected
            .iter()
            .zip(given.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));

        if diff == 0 {
            Ok(())
        } else {
            Err(AdminError::InvalidPassword)
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret_digest.is_some()
    }
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("configured", &self.is_configured())
            .finish()
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deleted {
    pub post_id: i64,
    pub comments: u64,
}

pub async fn delete_post(
    store: &dyn PostStore,
    gate: &AdminGate,
    post_id: i64,
    password: &str,
) -> Result<Deleted, AdminError> {
    gate.verify(password)?;

    let comments = store.delete_comments(post_id).await?;

    let removed = store.delete_post(post_id).await.inspect_err(|e| {
        tracing::error!(
            post_id,
            comments_deleted = comments,
            error = ?e,
            "post delete failed after its comments were removed"
        );
    })?;

    if !removed {
        return Err(AdminError::PostNotFound(post_id));
    }

    tracing::info!(post_id, comments_deleted = comments, "post deleted by admin");
    Ok(Deleted { post_id, comments })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::{MemoryPostRepo, NewPost};

    async fn repo_with_post() -> (MemoryPostRepo, i64) {
        let repo = MemoryPostRepo::new();
        let post = repo
            .insert(NewPost {
                title: "t".into(),
                nick: "n".into(),
                content: "c".into(),
                ip: String::new(),
            })
            .await
            .unwrap();
        repo.add_comment(post.id, "a", "one");
        repo.add_comment(post.id, "b", "two");
        (repo, post.id)
    }

    #[test]
    fn gate_requires_exact_match() {
        let gate = AdminGate::new(Some("hunter2"));
        assert!(gate.verify("hunter2").is_ok());
        assert!(gate.verify("hunter2 ").is_err());
        assert!(gate.verify("").is_err());
    }

    #[test]
    fn unconfigured_gate_rejects_everything() {
        let gate = AdminGate::new(None);
        assert!(matches!(gate.verify(""), Err(AdminError::InvalidPassword)));
        assert!(!gate.is_configured());
    }

    #[test]
    fn debug_output_hides_secret() {
        let gate = AdminGate::new(Some("hunter2"));
        assert!(!format!("{gate:?}").contains("hunter2"));
    }

    #[tokio::test]
    async fn wrong_password_deletes_nothing() {
        let (repo, id) = repo_with_post().await;
        let gate = AdminGate::new(Some("secret"));

        let err = delete_post(&repo, &gate, id, "guess").await.unwrap_err();
        assert!(matches!(err, AdminError::InvalidPassword));
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.comment_count(id), 2);
    }

    #[tokio::test]
    async fn deletes_comments_and_post() {
        let (repo, id) = repo_with_post().await;
        let gate = AdminGate::new(Some("secret"));

        let deleted = delete_post(&repo, &gate, id, "secret").await.unwrap();
        assert_eq!(
            deleted,
            Deleted {
                post_id: id,
                comments: 2
            }
        );
        assert_eq!(repo.len(), 0);
        assert_eq!(repo.comment_count(id), 0);
    }

    #[tokio::test]
    async fn unknown_post_is_not_found() {
        let repo = MemoryPostRepo::new();
        let gate = AdminGate::new(Some("secret"));
        let err = delete_post(&repo, &gate, 99, "secret").await.unwrap_err();
        assert!(matches!(err, AdminError::PostNotFound(99)));
    }
}
