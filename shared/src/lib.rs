//! Shared types and stock logic for the Cafe Inventory Platform
//!
//! This crate contains the stock quantity and unit-conversion model shared
//! between the backend, the dashboard (via WASM), and other components.

pub mod conversion;
pub mod error;
pub mod ledger;
pub mod models;
pub mod reporting;
pub mod timestamp;
pub mod transaction;
pub mod types;
pub mod units;
pub mod validation;

pub use error::{StockError, StockResult};
pub use models::*;
pub use types::*;
pub use units::UnitRegistry;
pub use validation::*;
