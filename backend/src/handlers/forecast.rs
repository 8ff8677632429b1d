//! HTTP handlers proxying to the forecasting functions

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;
use shared::reporting::daily_activity;
use shared::{ReportWindow, StockLogEntry};
use uuid::Uuid;

use crate::error::AppResult;
use crate::external::forecasting::{
    AnomalyParams, DailyUsage, DemandForecast, DemandForecastParams, StockAnomaly,
};
use crate::middleware::CurrentUser;
use crate::services::ingredient::IngredientService;
use crate::services::stock::StockService;
use crate::AppState;

const DEFAULT_HISTORY_DAYS: u32 = 28;
const DEFAULT_HORIZON_DAYS: u32 = 7;

/// Forecast request for one ingredient
#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    pub ingredient_id: Uuid,
    pub history_days: Option<u32>,
    pub horizon_days: Option<u32>,
}

async fn history(
    state: &AppState,
    ingredient_id: Uuid,
    days: u32,
) -> AppResult<(ReportWindow, Vec<StockLogEntry>)> {
    let window = ReportWindow::trailing(Utc::now().date_naive(), days);
    let (start, end) = window.bounds();
    let entries = StockService::new(state.db.clone(), state.units.clone())
        .logs_between(start, end)
        .await?
        .into_iter()
        .filter(|entry| entry.ingredient_id == ingredient_id)
        .collect();
    Ok((window, entries))
}

/// Forecast daily demand from the recent stock log
pub async fn forecast_demand(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<ForecastRequest>,
) -> AppResult<Json<DemandForecast>> {
    let ingredient = IngredientService::new(state.db.clone(), state.units.clone())
        .get(input.ingredient_id)
        .await?;
    let (window, entries) = history(
        &state,
        ingredient.id,
        input.history_days.unwrap_or(DEFAULT_HISTORY_DAYS),
    )
    .await?;

    let params = DemandForecastParams {
        ingredient_id: ingredient.id,
        unit: ingredient.unit,
        history: daily_activity(&window, &entries)
            .into_iter()
            .map(|point| DailyUsage {
                date: point.date,
                quantity: point.removed,
            })
            .collect(),
        horizon_days: input.horizon_days.unwrap_or(DEFAULT_HORIZON_DAYS),
    };

    let forecast = state.forecast.forecast_demand(&params).await?;
    Ok(Json(forecast))
}

/// Flag unusual movements in the recent stock log
pub async fn detect_anomalies(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<ForecastRequest>,
) -> AppResult<Json<Vec<StockAnomaly>>> {
    let ingredient = IngredientService::new(state.db.clone(), state.units.clone())
        .get(input.ingredient_id)
        .await?;
    let (_, entries) = history(
        &state,
        ingredient.id,
        input.history_days.unwrap_or(DEFAULT_HISTORY_DAYS),
    )
    .await?;

    let params = AnomalyParams {
        ingredient_id: ingredient.id,
        entries: &entries,
    };
    let anomalies = state.forecast.detect_anomalies(&params).await?;
    Ok(Json(anomalies))
}
