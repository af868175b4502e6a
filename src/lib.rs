//! powerbill Library
//!
//! Re-exports modules for integration testing and the seed binary.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod store;

pub use config::{Config, StoreBackend};
pub use error::{AppError, AppResult};
