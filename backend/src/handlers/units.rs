//! HTTP handlers for unit reference data and conversion

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::conversion::{convert, format_for_display, to_base};

use crate::error::AppResult;
use crate::models::{UnitDefinition, UnitType};
use crate::AppState;

/// Conversion request
#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

/// Conversion result with the base amount and its display form
#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub result: f64,
    pub base_amount: f64,
    pub display: String,
}

/// List every known unit
pub async fn list_units(State(state): State<AppState>) -> Json<Vec<UnitDefinition>> {
    Json(state.units.all().to_vec())
}

/// List the units of one type, smallest first
pub async fn list_units_for_type(
    State(state): State<AppState>,
    Path(unit_type): Path<String>,
) -> AppResult<Json<Vec<UnitDefinition>>> {
    let unit_type: UnitType = unit_type.parse()?;
    let units = state
        .units
        .units_for_type(unit_type)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(units))
}

/// Convert an amount between two units of the same type
pub async fn convert_units(
    State(state): State<AppState>,
    Json(input): Json<ConvertRequest>,
) -> AppResult<Json<ConvertResponse>> {
    let result = convert(&state.units, input.amount, &input.from, &input.to)?;
    let base_amount = to_base(&state.units, input.amount, &input.from)?;
    let unit_type = state.units.lookup(&input.from)?.unit_type;

    Ok(Json(ConvertResponse {
        display: format_for_display(&state.units, base_amount, unit_type),
        amount: input.amount,
        from: input.from,
        to: input.to,
        result,
        base_amount,
    }))
}
