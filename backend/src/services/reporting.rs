//! Reporting service for stock analytics and data export
//! Provides daily activity, consumption ranking and reason breakdown reports

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::reporting::{build_report, daily_activity, reason_breakdown, top_consumption};
use shared::timestamp::{to_instant, RawTimestamp};
use shared::{
    ConsumptionRank, DailyActivityPoint, ReasonTotal, ReportWindow, StockLogEntry, StockReport,
    UnitRegistry,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::config::ReportingConfig;
use crate::error::{AppError, AppResult};
use crate::services::ingredient::IngredientService;
use crate::services::stock::StockService;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    ingredients: IngredientService,
    stock: StockService,
    config: ReportingConfig,
}

/// Report query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// RFC 3339 instant or `YYYY-MM-DD`
    pub start: Option<String>,
    pub end: Option<String>,
    pub top_n: Option<usize>,
    pub format: Option<String>, // "json" or "csv"
}

impl ReportQuery {
    /// Resolve the requested window, defaulting to the trailing days up to `today`
    pub fn window(&self, default_days: u32, today: NaiveDate) -> AppResult<ReportWindow> {
        let end = match &self.end {
            Some(raw) => parse_date("end", raw)?,
            None => today,
        };
        let window = match &self.start {
            Some(raw) => ReportWindow::new(parse_date("start", raw)?, end)?,
            None => ReportWindow::trailing(end, default_days),
        };
        Ok(window)
    }

    pub fn wants_csv(&self) -> bool {
        self.format.as_deref() == Some("csv")
    }
}

fn parse_date(field: &str, raw: &str) -> AppResult<NaiveDate> {
    to_instant(&RawTimestamp::Text(raw.to_string()))
        .map(|instant| instant.date_naive())
        .map_err(|e| AppError::validation(field, e.to_string()))
}

/// Flat CSV row for the combined stock report
#[derive(Debug, Serialize, PartialEq)]
pub struct StockReportRow {
    pub section: &'static str,
    pub key: String,
    pub label: Option<String>,
    pub added: Option<f64>,
    pub removed: Option<f64>,
    pub cost: Option<Decimal>,
}

impl ReportingService {
    pub fn new(db: PgPool, units: Arc<UnitRegistry>, config: ReportingConfig) -> Self {
        Self {
            ingredients: IngredientService::new(db.clone(), units.clone()),
            stock: StockService::new(db, units),
            config,
        }
    }

    /// Resolve the window of a report request against today's date
    pub fn resolve_window(&self, query: &ReportQuery) -> AppResult<ReportWindow> {
        query.window(self.config.default_window_days, Utc::now().date_naive())
    }

    /// All three projections for a window
    pub async fn get_stock_report(
        &self,
        window: ReportWindow,
        top_n: Option<usize>,
    ) -> AppResult<StockReport> {
        let entries = self.entries_in(&window).await?;
        let catalog = self.ingredients.catalog().await?;
        Ok(build_report(
            window,
            &entries,
            &catalog,
            top_n.unwrap_or(self.config.default_top_n),
        ))
    }

    /// Added and removed totals per day
    pub async fn get_daily_activity(
        &self,
        window: ReportWindow,
    ) -> AppResult<Vec<DailyActivityPoint>> {
        let entries = self.entries_in(&window).await?;
        Ok(daily_activity(&window, &entries))
    }

    /// Most consumed ingredients
    pub async fn get_top_consumption(
        &self,
        window: ReportWindow,
        top_n: Option<usize>,
    ) -> AppResult<Vec<ConsumptionRank>> {
        let entries = self.entries_in(&window).await?;
        let catalog = self.ingredients.catalog().await?;
        Ok(top_consumption(
            &window,
            &entries,
            &catalog,
            top_n.unwrap_or(self.config.default_top_n),
        ))
    }

    /// Removed quantity per reason bucket
    pub async fn get_reason_breakdown(&self, window: ReportWindow) -> AppResult<Vec<ReasonTotal>> {
        let entries = self.entries_in(&window).await?;
        Ok(reason_breakdown(&window, &entries))
    }

    async fn entries_in(&self, window: &ReportWindow) -> AppResult<Vec<StockLogEntry>> {
        let (start, end) = window.bounds();
        self.stock.logs_between(start, end).await
    }

    /// Flatten a stock report into CSV rows, one section after another
    pub fn report_rows(report: &StockReport) -> Vec<StockReportRow> {
        let daily = report.daily_activity.iter().map(|point| StockReportRow {
            section: "daily_activity",
            key: point.date.to_string(),
            label: None,
            added: Some(point.added),
            removed: Some(point.removed),
            cost: None,
        });
        let top = report.top_consumption.iter().map(|rank| StockReportRow {
            section: "top_consumption",
            key: rank.ingredient_id.to_string(),
            label: rank.ingredient_name.clone(),
            added: None,
            removed: Some(rank.total_consumed),
            cost: rank.cost,
        });
        let reasons = report.reason_breakdown.iter().map(|total| StockReportRow {
            section: "reason_breakdown",
            key: total.bucket.as_str().to_string(),
            label: None,
            added: None,
            removed: Some(total.total),
            cost: None,
        });
        daily.chain(top).chain(reasons).collect()
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}
