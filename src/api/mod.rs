/*
 * Responsibility
 * - HTTP surface: routes() plus the handler/DTO/extractor modules behind it
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;
