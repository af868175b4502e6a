//! Domain layer
//!
//! Data model, validators and billing rules shared by both persistence
//! backends. Everything here is pure and synchronous.

pub mod billing;
pub mod model;
pub mod validate;

pub use model::{AppState, Bill, Consumer, DEFAULT_COST_PER_UNIT};
