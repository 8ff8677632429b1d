//! Chart-ready stock report models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StockReason;
use crate::types::ReportWindow;

/// Stock movement totals for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyActivityPoint {
    pub date: NaiveDate,
    pub added: f64,
    pub removed: f64,
}

/// Consumption total for one ingredient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsumptionRank {
    pub ingredient_id: Uuid,
    /// None when the ingredient is missing from the catalog
    pub ingredient_name: Option<String>,
    pub unit: Option<String>,
    pub total_consumed: f64,
    pub cost: Option<Decimal>,
}

/// Bucket used by the reason breakdown chart
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReasonBucket {
    /// Catch-all for sale, production and other usage
    Consumption,
    Waste,
    Expired,
    Adjustment,
}

impl ReasonBucket {
    /// Chart order
    pub const ALL: [ReasonBucket; 4] = [
        ReasonBucket::Consumption,
        ReasonBucket::Waste,
        ReasonBucket::Expired,
        ReasonBucket::Adjustment,
    ];

    pub fn for_reason(reason: StockReason) -> Self {
        match reason {
            StockReason::Waste => ReasonBucket::Waste,
            StockReason::Expired => ReasonBucket::Expired,
            StockReason::Adjustment => ReasonBucket::Adjustment,
            StockReason::Consumption | StockReason::Correction | StockReason::Purchase => {
                ReasonBucket::Consumption
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonBucket::Consumption => "consumption",
            ReasonBucket::Waste => "waste",
            ReasonBucket::Expired => "expired",
            ReasonBucket::Adjustment => "adjustment",
        }
    }
}

/// Removed quantity for one bucket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReasonTotal {
    pub bucket: ReasonBucket,
    pub total: f64,
}

/// All three projections over one window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockReport {
    pub window: ReportWindow,
    pub daily_activity: Vec<DailyActivityPoint>,
    pub top_consumption: Vec<ConsumptionRank>,
    pub reason_breakdown: Vec<ReasonTotal>,
}
