//! Types shared by the QIOS server and its API clients
//!
//! Error codes and the response envelope, domain models, and a few
//! time/id helpers.

pub mod error;
pub mod models;
pub mod util;

pub use serde::{Deserialize, Serialize};
