//! HTTP handlers for purchase order endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{PaginatedResponse, Pagination};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::PurchaseOrder;
use crate::services::purchase_order::{
    CreatePurchaseOrderInput, PurchaseOrderFilter, PurchaseOrderService, ReceiptResult,
};
use crate::AppState;

/// Create a purchase order
pub async fn create_purchase_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreatePurchaseOrderInput>,
) -> AppResult<(StatusCode, Json<PurchaseOrder>)> {
    let service = PurchaseOrderService::new(state.db, state.units);
    let order = service.create(current_user.0.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// List purchase orders, optionally by status
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<PurchaseOrderFilter>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<PurchaseOrder>>> {
    let service = PurchaseOrderService::new(state.db, state.units);
    let orders = service.list(filter, pagination).await?;
    Ok(Json(orders))
}

/// Get a purchase order by ID
pub async fn get_purchase_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<PurchaseOrder>> {
    let service = PurchaseOrderService::new(state.db, state.units);
    let order = service.get(order_id).await?;
    Ok(Json(order))
}

/// Receive a purchase order into stock
pub async fn receive_purchase_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<ReceiptResult>> {
    let service = PurchaseOrderService::new(state.db, state.units);
    let receipt = service.receive(order_id, current_user.0.user_id).await?;
    Ok(Json(receipt))
}
