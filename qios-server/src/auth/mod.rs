//! Authentication: user JWTs, per-route access and rate limiting

pub mod jwt;
pub mod rate_limit;

pub use jwt::{Access, UserIdentity};
pub use rate_limit::RateLimiter;
