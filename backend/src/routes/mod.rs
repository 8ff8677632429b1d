//! Route definitions for the Cafe Inventory Platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    // Everything touching stock needs an authenticated actor
    let protected = Router::new()
        .nest("/ingredients", ingredient_routes())
        .nest("/stock", stock_routes())
        .nest("/purchase-orders", purchase_order_routes())
        .nest("/reports", report_routes())
        .nest("/forecast", forecast_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Unit reference data (public)
        .nest("/units", unit_routes())
        .merge(protected)
}

/// Unit reference routes (public)
fn unit_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_units))
        .route("/convert", post(handlers::convert_units))
        .route("/:unit_type", get(handlers::list_units_for_type))
}

/// Ingredient catalog routes (protected)
fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_ingredients).post(handlers::create_ingredient),
        )
        .route(
            "/:ingredient_id",
            get(handlers::get_ingredient).put(handlers::update_ingredient),
        )
}

/// Stock level and change routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stock_levels))
        .route("/:ingredient_id", get(handlers::get_stock_level))
        .route("/:ingredient_id/changes", post(handlers::record_stock_change))
        .route("/:ingredient_id/logs", get(handlers::list_stock_logs))
}

/// Purchase order routes (protected)
fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchase_orders).post(handlers::create_purchase_order),
        )
        .route("/:order_id", get(handlers::get_purchase_order))
        .route("/:order_id/receive", post(handlers::receive_purchase_order))
}

/// Reporting routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/stock", get(handlers::get_stock_report))
        .route("/daily", get(handlers::get_daily_activity_report))
        .route("/consumption", get(handlers::get_consumption_report))
        .route("/reasons", get(handlers::get_reason_report))
}

/// Forecasting proxy routes (protected)
fn forecast_routes() -> Router<AppState> {
    Router::new()
        .route("/demand", post(handlers::forecast_demand))
        .route("/anomalies", post(handlers::detect_anomalies))
}
