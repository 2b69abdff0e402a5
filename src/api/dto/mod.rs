pub mod admin;
pub mod posts;
