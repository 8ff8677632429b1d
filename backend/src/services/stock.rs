//! Stock service: commits evaluated stock changes and serves stock levels
//!
//! Each change runs inside one database transaction. The stock row is locked,
//! the evaluator decides the outcome, then the balance update and the log entry
//! are written together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::transaction::{evaluate, EvaluatedChange, StockChangeRequest};
use shared::{
    PaginatedResponse, Pagination, PaginationMeta, StockError, StockLevel, StockLogEntry,
    StockReason, StockRecord, UnitRegistry,
};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::ingredient::{fetch_ingredient, IngredientRow};

/// Stock service for recording changes and reading levels
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
    units: Arc<UnitRegistry>,
}

/// Stock log row; `reason` is stored as text
#[derive(Debug, FromRow)]
pub(crate) struct StockLogRow {
    id: Uuid,
    ingredient_id: Uuid,
    change_amount: f64,
    reason: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<StockLogRow> for StockLogEntry {
    type Error = StockError;

    fn try_from(row: StockLogRow) -> Result<Self, Self::Error> {
        Ok(StockLogEntry {
            id: row.id,
            ingredient_id: row.ingredient_id,
            change_amount: row.change_amount,
            reason: row.reason.parse()?,
            user_id: row.user_id,
            created_at: row.created_at,
        })
    }
}

/// Ingredient joined with its stock record
#[derive(Debug, FromRow)]
struct LevelRow {
    #[sqlx(flatten)]
    ingredient: IngredientRow,
    quantity: f64,
    last_updated: DateTime<Utc>,
}

const LEVEL_QUERY: &str = r#"
    SELECT i.id, i.name, i.unit, i.cost_per_unit, i.min_stock_level, i.max_stock_level,
           i.supplier_id, i.created_at, i.updated_at,
           COALESCE(s.quantity, 0) AS quantity,
           COALESCE(s.last_updated, i.created_at) AS last_updated
    FROM ingredients i
    LEFT JOIN stock_records s ON s.ingredient_id = i.id
"#;

/// A stock change as entered by a user
#[derive(Debug, Deserialize)]
pub struct RecordChangeInput {
    /// Signed amount: positive adds stock, negative removes it
    pub amount: f64,
    pub unit: String,
    pub reason: StockReason,
}

/// Result of a committed stock change
#[derive(Debug, Serialize)]
pub struct StockChangeResult {
    pub previous_quantity: f64,
    pub new_quantity: f64,
    pub entry: StockLogEntry,
    pub level: StockLevel,
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool, units: Arc<UnitRegistry>) -> Self {
        Self { db, units }
    }

    /// Convert, evaluate and commit one stock change
    pub async fn record_change(
        &self,
        ingredient_id: Uuid,
        actor_id: Uuid,
        input: RecordChangeInput,
    ) -> AppResult<StockChangeResult> {
        let ingredient = fetch_ingredient(&self.db, ingredient_id).await?;
        let request = StockChangeRequest::from_quantity(
            &self.units,
            &ingredient,
            input.amount,
            &input.unit,
            input.reason,
            actor_id,
        )?;

        let now = Utc::now();
        let mut tx = self.db.begin().await?;
        let change = apply_in_tx(&mut tx, &request, now).await?;
        tx.commit().await?;

        let record = StockRecord::new(ingredient_id, change.new_quantity, now);
        let level = StockLevel::build(&self.units, ingredient, &record)?;

        Ok(StockChangeResult {
            previous_quantity: change.previous_quantity,
            new_quantity: change.new_quantity,
            entry: change.entry,
            level,
        })
    }

    /// Current level of every ingredient
    pub async fn list_levels(&self) -> AppResult<Vec<StockLevel>> {
        let rows = sqlx::query_as::<_, LevelRow>(&format!("{} ORDER BY i.name, i.id", LEVEL_QUERY))
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(|row| self.to_level(row)).collect()
    }

    /// Current level of one ingredient
    pub async fn get_level(&self, ingredient_id: Uuid) -> AppResult<StockLevel> {
        let row = sqlx::query_as::<_, LevelRow>(&format!("{} WHERE i.id = $1", LEVEL_QUERY))
            .bind(ingredient_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))?;

        self.to_level(row)
    }

    /// Stock log of one ingredient, newest first
    pub async fn list_logs(
        &self,
        ingredient_id: Uuid,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<StockLogEntry>> {
        // 404 for unknown ingredients rather than an empty page
        fetch_ingredient(&self.db, ingredient_id).await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM stock_logs WHERE ingredient_id = $1",
        )
        .bind(ingredient_id)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, StockLogRow>(
            r#"
            SELECT id, ingredient_id, change_amount, reason, user_id, created_at
            FROM stock_logs
            WHERE ingredient_id = $1
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(ingredient_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let data = rows
            .into_iter()
            .map(StockLogEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(&pagination, total.max(0) as u64),
        })
    }

    /// Every log entry with `start <= created_at < end`, oldest first
    pub async fn logs_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<StockLogEntry>> {
        let rows = sqlx::query_as::<_, StockLogRow>(
            r#"
            SELECT id, ingredient_id, change_amount, reason, user_id, created_at
            FROM stock_logs
            WHERE created_at >= $1 AND created_at < $2
            ORDER BY created_at, id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(StockLogEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn to_level(&self, row: LevelRow) -> AppResult<StockLevel> {
        let record = StockRecord::new(row.ingredient.id, row.quantity, row.last_updated);
        Ok(StockLevel::build(&self.units, row.ingredient.into(), &record)?)
    }
}

/// Lock, evaluate and write one change inside an open transaction
///
/// Nothing is written when the evaluator rejects the change; the caller's
/// transaction is rolled back when dropped.
pub(crate) async fn apply_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    request: &StockChangeRequest,
    now: DateTime<Utc>,
) -> AppResult<EvaluatedChange> {
    let current = sqlx::query_scalar::<_, f64>(
        "SELECT quantity FROM stock_records WHERE ingredient_id = $1 FOR UPDATE",
    )
    .bind(request.ingredient_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(StockError::IngredientNotFound(request.ingredient_id))?;

    let change = match evaluate(request, current, now) {
        Ok(change) => change,
        Err(err) => {
            tracing::warn!(
                ingredient_id = %request.ingredient_id,
                change_amount = request.change_amount,
                reason = %request.reason,
                "stock change rejected: {}",
                err
            );
            return Err(err.into());
        }
    };

    // The row is locked, so the balance read above is still current
    let updated = sqlx::query_scalar::<_, f64>(
        r#"
        UPDATE stock_records
        SET quantity = $2, last_updated = $3
        WHERE ingredient_id = $1 AND quantity = $4
        RETURNING quantity
        "#,
    )
    .bind(request.ingredient_id)
    .bind(change.new_quantity)
    .bind(now)
    .bind(change.previous_quantity)
    .fetch_optional(&mut **tx)
    .await?;

    if updated.is_none() {
        return Err(AppError::Internal(format!(
            "stock record for {} changed during update",
            request.ingredient_id
        )));
    }

    let entry = &change.entry;
    sqlx::query(
        r#"
        INSERT INTO stock_logs (id, ingredient_id, change_amount, reason, user_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(entry.id)
    .bind(entry.ingredient_id)
    .bind(entry.change_amount)
    .bind(entry.reason.as_str())
    .bind(entry.user_id)
    .bind(entry.created_at)
    .execute(&mut **tx)
    .await?;

    tracing::info!(
        ingredient_id = %entry.ingredient_id,
        change_amount = entry.change_amount,
        reason = %entry.reason,
        new_quantity = change.new_quantity,
        "stock change committed"
    );

    Ok(change)
}
