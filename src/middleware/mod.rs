/*
 * Responsibility
 * - Public interface of the middleware layer
 * - router-wide: cors / http / security_headers; route-scoped: rate_limit
 */
pub mod cors;
pub mod http;
pub mod rate_limit;
pub mod security_headers;
