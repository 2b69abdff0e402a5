pub mod error;
pub mod memory_post_repo;
pub mod post_repo;

pub use error::RepoError;
pub use memory_post_repo::MemoryPostRepo;
pub use post_repo::{NewPost, PgPostRepo, Post, PostStore};
