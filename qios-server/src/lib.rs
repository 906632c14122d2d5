//! qios-server - retail point-of-sale and back-office service
//!
//! - Product catalog with recipes over a raw-material inventory
//! - Orders that decrement product and material stock under row locks
//! - Customers, notifications and a dashboard per store
//! - AI business insights (Gemini) and Indonesian payment gateways

pub mod ai;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod orders;
pub mod payment;
pub mod state;
pub mod util;
pub mod validation;

pub use api::build_router;
pub use config::Config;
pub use state::AppState;
