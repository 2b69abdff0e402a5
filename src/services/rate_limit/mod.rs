pub mod memory;
pub mod store;
pub mod valkey;

pub use memory::MemoryRateLimiter;
pub use store::{FixedWindow, RateLimitDecision, RateLimiter};
pub use valkey::ValkeyRateLimiter;
