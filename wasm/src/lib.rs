//! WebAssembly module for the Cafe Inventory Platform
//!
//! Provides client-side computation for:
//! - Unit conversion and display formatting
//! - Stock status and reorder suggestions
//! - Previews of stock changes before they are submitted
//! - Chart data for the stock dashboard

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use shared::conversion::{convert, format_for_display, from_base, to_base};
use shared::reporting::build_report;
use shared::timestamp::{to_instant, RawTimestamp};
use shared::transaction::{evaluate, StockChangeRequest};
use shared::{StockError, StockResult};
use std::collections::HashMap;
use uuid::Uuid;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::units::UnitRegistry;

/// Log a rejected input to the browser console and hand it back to JavaScript
fn reject(err: impl std::fmt::Display) -> JsValue {
    let message = err.to_string();
    web_sys::console::warn_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

fn registry() -> &'static UnitRegistry {
    UnitRegistry::standard()
}

/// Convert an amount into the base unit of its type
#[wasm_bindgen]
pub fn to_base_units(amount: f64, unit: &str) -> Result<f64, JsValue> {
    to_base(registry(), amount, unit).map_err(reject)
}

/// Convert a base amount into `unit`
#[wasm_bindgen]
pub fn from_base_units(base_amount: f64, unit: &str) -> Result<f64, JsValue> {
    from_base(registry(), base_amount, unit).map_err(reject)
}

/// Convert between two units of the same type
#[wasm_bindgen]
pub fn convert_quantity(amount: f64, from: &str, to: &str) -> Result<f64, JsValue> {
    convert(registry(), amount, from, to).map_err(reject)
}

/// Render a base amount as e.g. "30.00 kg"
#[wasm_bindgen]
pub fn format_quantity(base_amount: f64, unit_type: &str) -> Result<String, JsValue> {
    let unit_type: UnitType = unit_type.parse().map_err(reject)?;
    Ok(format_for_display(registry(), base_amount, unit_type))
}

/// Whether a unit symbol is known
#[wasm_bindgen]
pub fn is_known_unit(unit: &str) -> bool {
    registry().contains(unit)
}

/// Units of one type as JSON, smallest first
#[wasm_bindgen]
pub fn units_for_type_json(unit_type: &str) -> Result<String, JsValue> {
    let unit_type: UnitType = unit_type.parse().map_err(reject)?;
    serde_json::to_string(&registry().units_for_type(unit_type)).map_err(reject)
}

/// Stock status: "out_of_stock", "low" or "good"
#[wasm_bindgen]
pub fn classify_stock(quantity: f64, min_level: f64, max_level: f64) -> String {
    classify(quantity, min_level, max_level).as_str().to_string()
}

/// Suggested order to bring stock back to its maximum level
#[wasm_bindgen]
pub fn recommend_reorder(quantity: f64, min_level: f64, max_level: f64) -> f64 {
    reorder_quantity(quantity, min_level, max_level)
}

/// Outcome of a stock change, computed before it is submitted
#[derive(Debug, Serialize)]
pub struct StockChangePreview {
    pub previous_quantity: f64,
    pub new_quantity: f64,
    pub change_amount: f64,
    pub status: InventoryStatus,
    pub display: String,
}

fn preview(
    ingredient: &Ingredient,
    current_quantity: f64,
    amount: f64,
    unit: &str,
    reason: StockReason,
    actor_id: Uuid,
    now: DateTime<Utc>,
) -> StockResult<StockChangePreview> {
    let registry = registry();
    let request =
        StockChangeRequest::from_quantity(registry, ingredient, amount, unit, reason, actor_id)?;
    let change = evaluate(&request, current_quantity, now)?;
    let unit_type = ingredient.unit_type(registry)?;

    Ok(StockChangePreview {
        previous_quantity: change.previous_quantity,
        new_quantity: change.new_quantity,
        change_amount: change.entry.change_amount,
        status: classify(
            change.new_quantity,
            ingredient.min_stock_level,
            ingredient.max_stock_level,
        ),
        display: format_for_display(registry, change.new_quantity, unit_type),
    })
}

/// Preview a stock change as JSON; rejected changes return the error message
#[wasm_bindgen]
pub fn preview_stock_change(
    ingredient_json: &str,
    current_quantity: f64,
    amount: f64,
    unit: &str,
    reason: &str,
    actor_id: &str,
) -> Result<String, JsValue> {
    let ingredient: Ingredient = serde_json::from_str(ingredient_json)
        .map_err(|e| reject(format!("Invalid ingredient JSON: {}", e)))?;
    let reason: StockReason = reason.parse().map_err(reject)?;
    let actor_id = Uuid::parse_str(actor_id).map_err(|e| reject(format!("Invalid actor ID: {}", e)))?;
    let now = Utc
        .timestamp_millis_opt(js_sys::Date::now() as i64)
        .single()
        .ok_or_else(|| reject("Browser clock is out of range"))?;

    let result = preview(&ingredient, current_quantity, amount, unit, reason, actor_id, now)
        .map_err(reject)?;
    serde_json::to_string(&result).map_err(reject)
}

/// Stock log entry as stored by the client, with its raw timestamp
#[derive(Debug, Deserialize)]
struct RawLogEntry {
    id: Uuid,
    ingredient_id: Uuid,
    change_amount: f64,
    reason: StockReason,
    user_id: Uuid,
    created_at: RawTimestamp,
}

impl RawLogEntry {
    fn normalize(self) -> StockResult<StockLogEntry> {
        Ok(StockLogEntry {
            id: self.id,
            ingredient_id: self.ingredient_id,
            change_amount: self.change_amount,
            reason: self.reason,
            user_id: self.user_id,
            created_at: to_instant(&self.created_at)?,
        })
    }
}

fn window_from(start: &str, end: &str) -> StockResult<ReportWindow> {
    let start = to_instant(&RawTimestamp::Text(start.to_string()))?.date_naive();
    let end = to_instant(&RawTimestamp::Text(end.to_string()))?.date_naive();
    ReportWindow::new(start, end)
}

fn report(
    entries_json: &str,
    catalog_json: &str,
    start: &str,
    end: &str,
    top_n: usize,
) -> Result<StockReport, String> {
    let raw: Vec<RawLogEntry> = serde_json::from_str(entries_json)
        .map_err(|e| format!("Invalid entries JSON: {}", e))?;
    let catalog: Vec<Ingredient> = serde_json::from_str(catalog_json)
        .map_err(|e| format!("Invalid catalog JSON: {}", e))?;

    let entries = raw
        .into_iter()
        .map(RawLogEntry::normalize)
        .collect::<StockResult<Vec<_>>>()
        .map_err(|e: StockError| e.to_string())?;
    let catalog: HashMap<Uuid, Ingredient> = catalog.into_iter().map(|i| (i.id, i)).collect();
    let window = window_from(start, end).map_err(|e| e.to_string())?;

    Ok(build_report(window, &entries, &catalog, top_n))
}

/// Build the dashboard stock report as JSON
///
/// `start` and `end` are dates (`YYYY-MM-DD`) or RFC 3339 instants.
#[wasm_bindgen]
pub fn stock_report_json(
    entries_json: &str,
    catalog_json: &str,
    start: &str,
    end: &str,
    top_n: usize,
) -> Result<String, JsValue> {
    let report = report(entries_json, catalog_json, start, end, top_n).map_err(reject)?;
    serde_json::to_string(&report).map_err(reject)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BEANS_ID: &str = "7d1c6a50-4f8e-4d55-9a43-9c4b1f2a0001";
    const BARISTA_ID: &str = "7d1c6a50-4f8e-4d55-9a43-9c4b1f2a00ff";

    fn beans_json() -> String {
        format!(
            r#"{{
                "id": "{}",
                "name": "Espresso Beans",
                "unit": "g",
                "cost_per_unit": "0.03",
                "min_stock_level": 1000.0,
                "max_stock_level": 10000.0,
                "supplier_id": null,
                "created_at": "2024-03-01T00:00:00Z",
                "updated_at": "2024-03-01T00:00:00Z"
            }}"#,
            BEANS_ID
        )
    }

    fn beans() -> Ingredient {
        serde_json::from_str(&beans_json()).unwrap()
    }

    #[test]
    fn test_conversions() {
        assert_eq!(to_base_units(25.0, "kg").unwrap(), 25_000.0);
        assert_eq!(from_base_units(1500.0, "L").unwrap(), 1.5);
        assert_eq!(convert_quantity(2.0, "dozen", "piece").unwrap(), 24.0);
        assert!(is_known_unit("ml"));
        assert!(!is_known_unit("stone"));
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(30_000.0, "weight").unwrap(), "30.00 kg");
        assert_eq!(format_quantity(250.0, "volume").unwrap(), "250.00 mL");
        assert_eq!(format_quantity(12.0, "count").unwrap(), "12 piece");
    }

    #[test]
    fn test_units_for_type_json() {
        let json = units_for_type_json("count").unwrap();
        let units: Vec<UnitDefinition> = serde_json::from_str(&json).unwrap();
        let symbols: Vec<_> = units.iter().map(|u| u.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["piece", "dozen", "case_24"]);
    }

    #[test]
    fn test_classify_and_reorder() {
        assert_eq!(classify_stock(0.0, 1000.0, 10_000.0), "out_of_stock");
        assert_eq!(classify_stock(1000.0, 1000.0, 10_000.0), "low");
        assert_eq!(classify_stock(12_000.0, 1000.0, 10_000.0), "good");
        assert_eq!(recommend_reorder(800.0, 1000.0, 10_000.0), 9200.0);
        assert_eq!(recommend_reorder(5000.0, 1000.0, 10_000.0), 0.0);
    }

    #[test]
    fn test_preview_restock() {
        let actor = Uuid::parse_str(BARISTA_ID).unwrap();
        let result = preview(&beans(), 5000.0, 25.0, "kg", StockReason::Purchase, actor, Utc::now())
            .unwrap();
        assert_eq!(result.previous_quantity, 5000.0);
        assert_eq!(result.new_quantity, 30_000.0);
        assert_eq!(result.status, InventoryStatus::Good);
        assert_eq!(result.display, "30.00 kg");
    }

    #[test]
    fn test_preview_rejections() {
        let actor = Uuid::parse_str(BARISTA_ID).unwrap();
        assert!(matches!(
            preview(&beans(), 500.0, -600.0, "g", StockReason::Consumption, actor, Utc::now()),
            Err(StockError::InsufficientStock { .. })
        ));
        assert!(matches!(
            preview(&beans(), 500.0, -1.0, "L", StockReason::Consumption, actor, Utc::now()),
            Err(StockError::IncompatibleUnit { .. })
        ));
        assert!(matches!(
            preview(&beans(), 500.0, 100.0, "g", StockReason::Waste, actor, Utc::now()),
            Err(StockError::InvalidChangeAmount(_))
        ));
    }

    #[test]
    fn test_report_normalizes_timestamps() {
        let entries = format!(
            r#"[
                {{"id": "00000000-0000-0000-0000-000000000001", "ingredient_id": "{id}",
                  "change_amount": 25000.0, "reason": "purchase", "user_id": "{user}",
                  "created_at": "2024-03-01T08:00:00Z"}},
                {{"id": "00000000-0000-0000-0000-000000000002", "ingredient_id": "{id}",
                  "change_amount": -1800.0, "reason": "consumption", "user_id": "{user}",
                  "created_at": 1709373600000}},
                {{"id": "00000000-0000-0000-0000-000000000003", "ingredient_id": "{id}",
                  "change_amount": -200.0, "reason": "waste", "user_id": "{user}",
                  "created_at": {{"seconds": 1709460000, "nanoseconds": 0}}}}
            ]"#,
            id = BEANS_ID,
            user = BARISTA_ID
        );
        let catalog = format!("[{}]", beans_json());

        let report = report(&entries, &catalog, "2024-03-01", "2024-03-03", 5).unwrap();

        let removed: Vec<_> = report.daily_activity.iter().map(|p| p.removed).collect();
        assert_eq!(removed, vec![0.0, 1800.0, 200.0]);
        assert_eq!(report.daily_activity[0].added, 25_000.0);
        assert_eq!(report.top_consumption.len(), 1);
        assert_eq!(report.top_consumption[0].total_consumed, 1800.0);
        assert_eq!(report.reason_breakdown.len(), 2);
    }

    #[test]
    fn test_report_rejects_bad_timestamp() {
        let entries = format!(
            r#"[{{"id": "00000000-0000-0000-0000-000000000001", "ingredient_id": "{}",
                 "change_amount": -1.0, "reason": "consumption",
                 "user_id": "{}", "created_at": "yesterday"}}]"#,
            BEANS_ID, BARISTA_ID
        );
        assert!(report(&entries, "[]", "2024-03-01", "2024-03-03", 5).is_err());
        assert!(report("[]", "[]", "2024-03-05", "2024-03-01", 5).is_err());
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_unknown_unit_rejected() {
        let err = to_base_units(1.0, "stone").unwrap_err();
        assert_eq!(err.as_string().as_deref(), Some("Unknown unit: stone"));
    }
}
