//! Derived inventory status

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Ingredient, StockRecord};
use crate::conversion::format_for_display;
use crate::error::StockResult;
use crate::units::UnitRegistry;

/// Stock status shown on the dashboard
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InventoryStatus {
    OutOfStock,
    Low,
    Good,
}

impl InventoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryStatus::OutOfStock => "out_of_stock",
            InventoryStatus::Low => "low",
            InventoryStatus::Good => "good",
        }
    }
}

impl std::fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InventoryStatus::OutOfStock => write!(f, "Out of Stock"),
            InventoryStatus::Low => write!(f, "Low Stock"),
            InventoryStatus::Good => write!(f, "In Stock"),
        }
    }
}

/// Classify a stock level against its par levels
///
/// `max_level` does not affect status; it only sizes reorders.
pub fn classify(quantity: f64, min_level: f64, _max_level: f64) -> InventoryStatus {
    // NaN lands here too
    if !(quantity > 0.0) {
        InventoryStatus::OutOfStock
    } else if quantity <= min_level {
        InventoryStatus::Low
    } else {
        InventoryStatus::Good
    }
}

/// Amount to order to bring a low or empty item back up to its max level
pub fn reorder_quantity(quantity: f64, min_level: f64, max_level: f64) -> f64 {
    match classify(quantity, min_level, max_level) {
        InventoryStatus::Good => 0.0,
        _ => {
            let on_hand = quantity.max(0.0);
            if max_level > on_hand {
                max_level - on_hand
            } else {
                0.0
            }
        }
    }
}

/// Read model combining an ingredient with its current stock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLevel {
    pub ingredient: Ingredient,
    pub quantity: f64,
    pub status: InventoryStatus,
    pub reorder_quantity: f64,
    pub display: String,
    pub value: Decimal,
}

impl StockLevel {
    pub fn build(
        registry: &UnitRegistry,
        ingredient: Ingredient,
        record: &StockRecord,
    ) -> StockResult<Self> {
        let unit_type = ingredient.unit_type(registry)?;
        let quantity = record.quantity;
        let status = classify(
            quantity,
            ingredient.min_stock_level,
            ingredient.max_stock_level,
        );
        let reorder = reorder_quantity(
            quantity,
            ingredient.min_stock_level,
            ingredient.max_stock_level,
        );
        let value = Decimal::try_from(quantity)
            .map(|q| (q * ingredient.cost_per_unit).round_dp(2))
            .unwrap_or(Decimal::ZERO);

        Ok(Self {
            display: format_for_display(registry, quantity, unit_type),
            ingredient,
            quantity,
            status,
            reorder_quantity: reorder,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(0.0, 10.0, 100.0), InventoryStatus::OutOfStock);
        assert_eq!(classify(10.0, 10.0, 100.0), InventoryStatus::Low);
        assert_eq!(classify(10.01, 10.0, 100.0), InventoryStatus::Good);
    }

    #[test]
    fn test_classify_negative_is_out_of_stock() {
        assert_eq!(classify(-1.0, 10.0, 100.0), InventoryStatus::OutOfStock);
        assert_eq!(classify(f64::NAN, 10.0, 100.0), InventoryStatus::OutOfStock);
    }

    #[test]
    fn test_classify_without_min_level() {
        for q in [0.001, 1.0, 5000.0] {
            assert_eq!(classify(q, 0.0, 100.0), InventoryStatus::Good);
        }
    }

    #[test]
    fn test_max_level_does_not_change_status() {
        assert_eq!(classify(500.0, 10.0, 100.0), InventoryStatus::Good);
        assert_eq!(classify(5.0, 10.0, 0.0), InventoryStatus::Low);
    }

    #[test]
    fn test_reorder_quantity() {
        assert_eq!(reorder_quantity(4.0, 10.0, 100.0), 96.0);
        assert_eq!(reorder_quantity(0.0, 10.0, 100.0), 100.0);
        assert_eq!(reorder_quantity(50.0, 10.0, 100.0), 0.0);
        // max below current stock
        assert_eq!(reorder_quantity(8.0, 10.0, 5.0), 0.0);
    }
}
