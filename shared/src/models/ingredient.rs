//! Ingredient catalog and stock record models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UnitType;
use crate::error::StockResult;
use crate::units::UnitRegistry;

/// A catalog ingredient
///
/// `unit` is the base unit symbol of the ingredient's type; stock levels and
/// par levels are all expressed in it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub unit: String,
    /// Cost per base unit
    pub cost_per_unit: Decimal,
    pub min_stock_level: f64,
    pub max_stock_level: f64,
    pub supplier_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ingredient {
    /// Unit type declared by the ingredient's unit
    pub fn unit_type(&self, registry: &UnitRegistry) -> StockResult<UnitType> {
        registry.lookup(&self.unit).map(|def| def.unit_type)
    }
}

/// Current stock of one ingredient, in base units
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockRecord {
    pub ingredient_id: Uuid,
    pub quantity: f64,
    pub last_updated: DateTime<Utc>,
}

impl StockRecord {
    pub fn new(ingredient_id: Uuid, quantity: f64, last_updated: DateTime<Utc>) -> Self {
        Self {
            ingredient_id,
            quantity,
            last_updated,
        }
    }
}
