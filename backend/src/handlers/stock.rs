//! HTTP handlers for stock levels and stock changes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{PaginatedResponse, Pagination};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{StockLevel, StockLogEntry};
use crate::services::stock::{RecordChangeInput, StockChangeResult, StockService};
use crate::AppState;

/// Current level and status of every ingredient
pub async fn list_stock_levels(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<StockLevel>>> {
    let service = StockService::new(state.db, state.units);
    let levels = service.list_levels().await?;
    Ok(Json(levels))
}

/// Current level of one ingredient
pub async fn get_stock_level(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
) -> AppResult<Json<StockLevel>> {
    let service = StockService::new(state.db, state.units);
    let level = service.get_level(ingredient_id).await?;
    Ok(Json(level))
}

/// Record a stock change for the current user
pub async fn record_stock_change(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
    Json(input): Json<RecordChangeInput>,
) -> AppResult<(StatusCode, Json<StockChangeResult>)> {
    let service = StockService::new(state.db, state.units);
    let result = service
        .record_change(ingredient_id, current_user.0.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// Stock log of one ingredient
pub async fn list_stock_logs(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<StockLogEntry>>> {
    let service = StockService::new(state.db, state.units);
    let logs = service.list_logs(ingredient_id, pagination).await?;
    Ok(Json(logs))
}
