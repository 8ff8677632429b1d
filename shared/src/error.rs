//! Domain errors for stock and unit handling

use thiserror::Error;
use uuid::Uuid;

use crate::models::{PurchaseOrderStatus, UnitType};

/// Errors raised by the stock core
///
/// Every variant is a local, synchronous validation outcome. Retrying the
/// same input fails the same way.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StockError {
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Unit {unit} is a {actual} unit, expected {expected}")]
    IncompatibleUnit {
        unit: String,
        expected: UnitType,
        actual: UnitType,
    },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid change amount: {0}")]
    InvalidChangeAmount(String),

    #[error("Insufficient stock for ingredient {ingredient_id}: {available} available, {requested} requested")]
    InsufficientStock {
        ingredient_id: Uuid,
        available: f64,
        requested: f64,
    },

    #[error("Purchase order {order_id} references missing ingredients")]
    PartialBatchFailure { order_id: Uuid, missing: Vec<Uuid> },

    #[error("Purchase order {order_id} is {status} and cannot be received")]
    InvalidOrderState {
        order_id: Uuid,
        status: PurchaseOrderStatus,
    },

    #[error("Invalid unit definition {symbol}: {reason}")]
    InvalidUnitDefinition { symbol: String, reason: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Ingredient not found: {0}")]
    IngredientNotFound(Uuid),
}

/// Result alias for stock core operations
pub type StockResult<T> = Result<T, StockError>;
