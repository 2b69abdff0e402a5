pub mod admin;
pub mod cache;
pub mod pagination;
pub mod posts;
pub mod rate_limit;
pub mod validation;
