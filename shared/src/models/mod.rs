//! Data models
//!
//! Shared between the server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes, all timestamps Unix milliseconds.

pub mod customer;
pub mod dashboard;
pub mod insight;
pub mod movement;
pub mod notification;
pub mod order;
pub mod payment;
pub mod product;
pub mod raw_material;
pub mod store;
pub mod user;

// Re-exports
pub use customer::*;
pub use dashboard::*;
pub use insight::*;
pub use movement::*;
pub use notification::*;
pub use order::*;
pub use payment::*;
pub use product::*;
pub use raw_material::*;
pub use store::*;
pub use user::*;
