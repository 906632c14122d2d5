//! Order domain: money math, pure planning and the transactional service

pub mod money;
pub mod plan;
pub mod service;

pub use service::{cancel_order, create_order};
