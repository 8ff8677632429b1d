//! Domain models for the backend
//!
//! Re-exports the stock models from the shared crate

pub use shared::models::*;
