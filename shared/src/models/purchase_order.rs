//! Purchase order models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::StockError;

/// Lifecycle of a purchase order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Draft,
    Ordered,
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Draft => "draft",
            PurchaseOrderStatus::Ordered => "ordered",
            PurchaseOrderStatus::Received => "received",
            PurchaseOrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_receive(&self) -> bool {
        matches!(self, PurchaseOrderStatus::Ordered)
    }
}

impl std::fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PurchaseOrderStatus {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PurchaseOrderStatus::Draft),
            "ordered" => Ok(PurchaseOrderStatus::Ordered),
            "received" => Ok(PurchaseOrderStatus::Received),
            "cancelled" => Ok(PurchaseOrderStatus::Cancelled),
            other => Err(StockError::InvalidAmount(format!(
                "unknown purchase order status {}",
                other
            ))),
        }
    }
}

/// One ordered ingredient, in the unit it was ordered in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseOrderLine {
    pub ingredient_id: Uuid,
    pub quantity: f64,
    pub unit: String,
    /// Price per ordered unit
    pub unit_cost: Option<Decimal>,
}

impl PurchaseOrderLine {
    pub fn line_total(&self) -> Option<Decimal> {
        let quantity = Decimal::try_from(self.quantity).ok()?;
        self.unit_cost.map(|cost| cost * quantity)
    }
}

/// A purchase order placed with a supplier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub status: PurchaseOrderStatus,
    pub line_items: Vec<PurchaseOrderLine>,
    pub created_at: DateTime<Utc>,
    pub received_at: Option<DateTime<Utc>>,
}

impl PurchaseOrder {
    /// Sum of priced lines; unpriced lines are skipped
    pub fn total_cost(&self) -> Decimal {
        self.line_items.iter().filter_map(|l| l.line_total()).sum()
    }
}
