//! Reporting handlers for stock analytics and data export

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::reporting::{ReportQuery, ReportingService};
use crate::AppState;

fn reporting_service(state: AppState) -> ReportingService {
    ReportingService::new(state.db, state.units, state.config.reporting.clone())
}

/// JSON by default, CSV download when `format=csv`
fn respond<T: Serialize>(query: &ReportQuery, data: &[T], filename: &str) -> AppResult<Response> {
    if query.wants_csv() {
        let csv = ReportingService::export_to_csv(data)?;
        let disposition = format!("attachment; filename=\"{}.csv\"", filename);
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(data).into_response())
    }
}

/// Get the full stock report: daily activity, top consumption and reasons
pub async fn get_stock_report(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = reporting_service(state);
    let window = service.resolve_window(&query)?;
    let report = service.get_stock_report(window, query.top_n).await?;

    if query.wants_csv() {
        let rows = ReportingService::report_rows(&report);
        respond(&query, &rows, "stock_report")
    } else {
        Ok(Json(report).into_response())
    }
}

/// Get added/removed totals per day
pub async fn get_daily_activity_report(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = reporting_service(state);
    let window = service.resolve_window(&query)?;
    let data = service.get_daily_activity(window).await?;
    respond(&query, &data, "daily_activity")
}

/// Get the most consumed ingredients
pub async fn get_consumption_report(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = reporting_service(state);
    let window = service.resolve_window(&query)?;
    let data = service.get_top_consumption(window, query.top_n).await?;
    respond(&query, &data, "top_consumption")
}

/// Get removed quantity per reason bucket
pub async fn get_reason_report(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = reporting_service(state);
    let window = service.resolve_window(&query)?;
    let data = service.get_reason_breakdown(window).await?;
    respond(&query, &data, "reason_breakdown")
}
