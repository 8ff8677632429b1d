//! Stock log models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::StockError;

/// Why a stock level changed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StockReason {
    /// Goods received from a supplier
    Purchase,
    /// Sale, production or any other use
    Consumption,
    Waste,
    Expired,
    /// Manual stock-take adjustment, either direction
    Adjustment,
    /// Fix for an earlier mistaken entry, either direction
    Correction,
}

/// Sign a change amount must carry for a given reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDirection {
    Increase,
    Decrease,
    Either,
}

impl StockReason {
    pub const ALL: [StockReason; 6] = [
        StockReason::Purchase,
        StockReason::Consumption,
        StockReason::Waste,
        StockReason::Expired,
        StockReason::Adjustment,
        StockReason::Correction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StockReason::Purchase => "purchase",
            StockReason::Consumption => "consumption",
            StockReason::Waste => "waste",
            StockReason::Expired => "expired",
            StockReason::Adjustment => "adjustment",
            StockReason::Correction => "correction",
        }
    }

    pub fn direction(&self) -> ChangeDirection {
        match self {
            StockReason::Purchase => ChangeDirection::Increase,
            StockReason::Consumption | StockReason::Waste | StockReason::Expired => {
                ChangeDirection::Decrease
            }
            StockReason::Adjustment | StockReason::Correction => ChangeDirection::Either,
        }
    }

    /// Waste and expiry are losses, not usage
    pub fn is_loss(&self) -> bool {
        matches!(self, StockReason::Waste | StockReason::Expired)
    }
}

impl std::fmt::Display for StockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockReason {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StockReason::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| StockError::InvalidChangeAmount(format!("unknown reason {}", s)))
    }
}

/// One append-only stock change
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockLogEntry {
    pub id: Uuid,
    pub ingredient_id: Uuid,
    /// Signed delta in base units
    pub change_amount: f64,
    pub reason: StockReason,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl StockLogEntry {
    pub fn is_addition(&self) -> bool {
        self.change_amount > 0.0
    }

    pub fn is_removal(&self) -> bool {
        self.change_amount < 0.0
    }
}
