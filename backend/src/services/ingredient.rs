//! Ingredient catalog service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::conversion::Quantity;
use shared::transaction::StockChangeRequest;
use shared::{
    validate_cost, validate_initial_stock, validate_ingredient_name, validate_par_levels,
    validate_stock_unit, Ingredient, PaginatedResponse, Pagination, PaginationMeta, StockReason,
    UnitRegistry,
};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::stock::apply_in_tx;

/// Ingredient service for managing the catalog
#[derive(Clone)]
pub struct IngredientService {
    db: PgPool,
    units: Arc<UnitRegistry>,
}

/// Ingredient row as stored
#[derive(Debug, Clone, FromRow)]
pub(crate) struct IngredientRow {
    pub id: Uuid,
    pub name: String,
    pub unit: String,
    pub cost_per_unit: Decimal,
    pub min_stock_level: f64,
    pub max_stock_level: f64,
    pub supplier_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<IngredientRow> for Ingredient {
    fn from(row: IngredientRow) -> Self {
        Ingredient {
            id: row.id,
            name: row.name,
            unit: row.unit,
            cost_per_unit: row.cost_per_unit,
            min_stock_level: row.min_stock_level,
            max_stock_level: row.max_stock_level,
            supplier_id: row.supplier_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(crate) const INGREDIENT_COLUMNS: &str = "id, name, unit, cost_per_unit, min_stock_level, \
     max_stock_level, supplier_id, created_at, updated_at";

/// Input for creating an ingredient
#[derive(Debug, Deserialize, Validate)]
pub struct CreateIngredientInput {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,
    /// Base unit symbol: g, mL or piece
    pub unit: String,
    pub cost_per_unit: Decimal,
    #[validate(range(min = 0.0, message = "Minimum stock level cannot be negative"))]
    pub min_stock_level: f64,
    #[validate(range(min = 0.0, message = "Maximum stock level cannot be negative"))]
    pub max_stock_level: f64,
    pub supplier_id: Option<Uuid>,
    /// Opening stock, in `initial_unit` or the ingredient unit
    pub initial_stock: Option<f64>,
    pub initial_unit: Option<String>,
}

/// Input for updating an ingredient; the unit cannot change once stock exists
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateIngredientInput {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: Option<String>,
    pub cost_per_unit: Option<Decimal>,
    pub min_stock_level: Option<f64>,
    pub max_stock_level: Option<f64>,
    pub supplier_id: Option<Uuid>,
}

impl IngredientService {
    /// Create a new IngredientService instance
    pub fn new(db: PgPool, units: Arc<UnitRegistry>) -> Self {
        Self { db, units }
    }

    /// Create an ingredient with its stock record
    ///
    /// Opening stock is logged as an adjustment so the log replays from zero.
    pub async fn create(&self, actor_id: Uuid, input: CreateIngredientInput) -> AppResult<Ingredient> {
        input.validate()?;
        validate_ingredient_name(&input.name).map_err(|m| AppError::validation("name", m))?;
        validate_stock_unit(&self.units, &input.unit).map_err(|m| AppError::validation("unit", m))?;
        validate_par_levels(input.min_stock_level, input.max_stock_level)
            .map_err(|m| AppError::validation("max_stock_level", m))?;
        validate_cost(input.cost_per_unit).map_err(|m| AppError::validation("cost_per_unit", m))?;

        let unit_type = self.units.lookup(&input.unit)?.unit_type;
        let opening = match input.initial_stock {
            Some(amount) => {
                let unit = input.initial_unit.as_deref().unwrap_or(&input.unit);
                let base = Quantity::new(amount, unit)?.to_base_for(&self.units, unit_type)?;
                validate_initial_stock(base).map_err(|m| AppError::validation("initial_stock", m))?;
                base
            }
            None => 0.0,
        };

        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, IngredientRow>(&format!(
            r#"
            INSERT INTO ingredients (
                name, unit, cost_per_unit, min_stock_level, max_stock_level,
                supplier_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {}
            "#,
            INGREDIENT_COLUMNS
        ))
        .bind(input.name.trim())
        .bind(&input.unit)
        .bind(input.cost_per_unit)
        .bind(input.min_stock_level)
        .bind(input.max_stock_level)
        .bind(input.supplier_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO stock_records (ingredient_id, quantity, last_updated) VALUES ($1, 0, $2)",
        )
        .bind(row.id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if opening > 0.0 {
            let request =
                StockChangeRequest::new(row.id, opening, StockReason::Adjustment, actor_id);
            apply_in_tx(&mut tx, &request, now).await?;
        }

        tx.commit().await?;

        tracing::info!(ingredient_id = %row.id, name = %row.name, opening, "ingredient created");
        Ok(row.into())
    }

    /// Get an ingredient by ID
    pub async fn get(&self, ingredient_id: Uuid) -> AppResult<Ingredient> {
        fetch_ingredient(&self.db, ingredient_id).await
    }

    /// List ingredients by name
    pub async fn list(&self, pagination: Pagination) -> AppResult<PaginatedResponse<Ingredient>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ingredients")
            .fetch_one(&self.db)
            .await?;

        let rows = sqlx::query_as::<_, IngredientRow>(&format!(
            "SELECT {} FROM ingredients ORDER BY name, id LIMIT $1 OFFSET $2",
            INGREDIENT_COLUMNS
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: rows.into_iter().map(Ingredient::from).collect(),
            pagination: PaginationMeta::new(&pagination, total.max(0) as u64),
        })
    }

    /// Update catalog fields of an ingredient
    pub async fn update(
        &self,
        ingredient_id: Uuid,
        input: UpdateIngredientInput,
    ) -> AppResult<Ingredient> {
        input.validate()?;
        let existing = self.get(ingredient_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let cost = input.cost_per_unit.unwrap_or(existing.cost_per_unit);
        let min_level = input.min_stock_level.unwrap_or(existing.min_stock_level);
        let max_level = input.max_stock_level.unwrap_or(existing.max_stock_level);
        let supplier_id = input.supplier_id.or(existing.supplier_id);

        validate_ingredient_name(&name).map_err(|m| AppError::validation("name", m))?;
        validate_par_levels(min_level, max_level)
            .map_err(|m| AppError::validation("max_stock_level", m))?;
        validate_cost(cost).map_err(|m| AppError::validation("cost_per_unit", m))?;

        let row = sqlx::query_as::<_, IngredientRow>(&format!(
            r#"
            UPDATE ingredients
            SET name = $2, cost_per_unit = $3, min_stock_level = $4,
                max_stock_level = $5, supplier_id = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            INGREDIENT_COLUMNS
        ))
        .bind(ingredient_id)
        .bind(name.trim())
        .bind(cost)
        .bind(min_level)
        .bind(max_level)
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))?;

        Ok(row.into())
    }

    /// Every ingredient keyed by ID
    pub async fn catalog(&self) -> AppResult<HashMap<Uuid, Ingredient>> {
        let rows = sqlx::query_as::<_, IngredientRow>(&format!(
            "SELECT {} FROM ingredients",
            INGREDIENT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.id, Ingredient::from(row)))
            .collect())
    }
}

/// Fetch one ingredient or fail with NotFound
pub(crate) async fn fetch_ingredient(db: &PgPool, ingredient_id: Uuid) -> AppResult<Ingredient> {
    sqlx::query_as::<_, IngredientRow>(&format!(
        "SELECT {} FROM ingredients WHERE id = $1",
        INGREDIENT_COLUMNS
    ))
    .bind(ingredient_id)
    .fetch_optional(db)
    .await?
    .map(Ingredient::from)
    .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))
}
