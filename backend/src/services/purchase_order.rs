//! Purchase order service
//!
//! Receiving an order adds every line to stock and marks the order received in
//! one database transaction. Either every line lands or none does.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::transaction::{plan_receipt, EvaluatedChange};
use shared::{
    Ingredient, PaginatedResponse, Pagination, PaginationMeta, PurchaseOrder, PurchaseOrderLine,
    PurchaseOrderStatus, UnitRegistry,
};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::ingredient::{IngredientRow, INGREDIENT_COLUMNS};
use crate::services::stock::apply_in_tx;

/// Purchase order service
#[derive(Clone)]
pub struct PurchaseOrderService {
    db: PgPool,
    units: Arc<UnitRegistry>,
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    supplier_id: Option<Uuid>,
    status: String,
    created_at: DateTime<Utc>,
    received_at: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct LineRow {
    purchase_order_id: Uuid,
    ingredient_id: Uuid,
    quantity: f64,
    unit: String,
    unit_cost: Option<Decimal>,
}

impl From<LineRow> for PurchaseOrderLine {
    fn from(row: LineRow) -> Self {
        PurchaseOrderLine {
            ingredient_id: row.ingredient_id,
            quantity: row.quantity,
            unit: row.unit,
            unit_cost: row.unit_cost,
        }
    }
}

/// One line of a new purchase order
#[derive(Debug, Deserialize, Serialize)]
pub struct OrderLineInput {
    pub ingredient_id: Uuid,
    pub quantity: f64,
    pub unit: String,
    pub unit_cost: Option<Decimal>,
}

/// Input for creating a purchase order
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePurchaseOrderInput {
    pub supplier_id: Option<Uuid>,
    /// `draft` (default) or `ordered`
    pub status: Option<PurchaseOrderStatus>,
    #[validate(length(min = 1, message = "A purchase order needs at least one line"))]
    pub line_items: Vec<OrderLineInput>,
}

/// Filter for listing purchase orders
#[derive(Debug, Deserialize)]
pub struct PurchaseOrderFilter {
    pub status: Option<PurchaseOrderStatus>,
}

/// A received order and the stock changes it produced
#[derive(Debug, Serialize)]
pub struct ReceiptResult {
    pub order: PurchaseOrder,
    pub changes: Vec<EvaluatedChange>,
}

impl PurchaseOrderService {
    /// Create a new PurchaseOrderService instance
    pub fn new(db: PgPool, units: Arc<UnitRegistry>) -> Self {
        Self { db, units }
    }

    /// Create a purchase order with its lines
    pub async fn create(
        &self,
        actor_id: Uuid,
        input: CreatePurchaseOrderInput,
    ) -> AppResult<PurchaseOrder> {
        input.validate()?;

        let status = input.status.unwrap_or(PurchaseOrderStatus::Draft);
        if !matches!(status, PurchaseOrderStatus::Draft | PurchaseOrderStatus::Ordered) {
            return Err(AppError::validation(
                "status",
                "A new purchase order must be draft or ordered",
            ));
        }

        for line in &input.line_items {
            if !line.quantity.is_finite() || line.quantity <= 0.0 {
                return Err(AppError::validation("line_items", "Line quantity must be positive"));
            }
            self.units.lookup(&line.unit)?;
            if line.unit_cost.is_some_and(|cost| cost.is_sign_negative()) {
                return Err(AppError::validation("line_items", "Line cost cannot be negative"));
            }
        }

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO purchase_orders (supplier_id, status, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, supplier_id, status, created_at, received_at
            "#,
        )
        .bind(input.supplier_id)
        .bind(status.as_str())
        .bind(actor_id)
        .fetch_one(&mut *tx)
        .await?;

        for (line_no, line) in input.line_items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO purchase_order_lines (
                    purchase_order_id, line_no, ingredient_id, quantity, unit, unit_cost
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(row.id)
            .bind(line_no as i32)
            .bind(line.ingredient_id)
            .bind(line.quantity)
            .bind(&line.unit)
            .bind(line.unit_cost)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let line_items = input
            .line_items
            .into_iter()
            .map(|line| PurchaseOrderLine {
                ingredient_id: line.ingredient_id,
                quantity: line.quantity,
                unit: line.unit,
                unit_cost: line.unit_cost,
            })
            .collect();

        tracing::info!(order_id = %row.id, status = %status, "purchase order created");
        to_order(row, line_items)
    }

    /// Get a purchase order with its lines
    pub async fn get(&self, order_id: Uuid) -> AppResult<PurchaseOrder> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, supplier_id, status, created_at, received_at FROM purchase_orders WHERE id = $1",
        )
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        let mut lines = fetch_lines(&self.db, &[order_id]).await?;
        to_order(row, lines.remove(&order_id).unwrap_or_default())
    }

    /// List purchase orders, newest first
    pub async fn list(
        &self,
        filter: PurchaseOrderFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<PurchaseOrder>> {
        let status = filter.status.map(|s| s.as_str());

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM purchase_orders WHERE ($1::TEXT IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, supplier_id, status, created_at, received_at
            FROM purchase_orders
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut lines = fetch_lines(&self.db, &ids).await?;

        let data = rows
            .into_iter()
            .map(|row| {
                let line_items = lines.remove(&row.id).unwrap_or_default();
                to_order(row, line_items)
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(&pagination, total.max(0) as u64),
        })
    }

    /// Receive an ordered purchase order into stock
    ///
    /// Lines referencing unknown ingredients fail the whole receipt with the
    /// full list of missing IDs; the order stays `ordered`.
    pub async fn receive(&self, order_id: Uuid, actor_id: Uuid) -> AppResult<ReceiptResult> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, supplier_id, status, created_at, received_at
            FROM purchase_orders
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        let mut lines = fetch_lines(&mut *tx, &[order_id]).await?;
        let mut order = to_order(row, lines.remove(&order_id).unwrap_or_default())?;

        let ingredient_ids: Vec<Uuid> = order.line_items.iter().map(|l| l.ingredient_id).collect();
        let catalog = fetch_catalog(&mut tx, &ingredient_ids).await?;

        let requests = match plan_receipt(&self.units, &order, &catalog, actor_id) {
            Ok(requests) => requests,
            Err(err) => {
                tracing::warn!(order_id = %order_id, "purchase order receipt rejected: {}", err);
                return Err(err.into());
            }
        };

        // Lock every affected stock row in ingredient order before writing
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT ingredient_id FROM stock_records
            WHERE ingredient_id = ANY($1)
            ORDER BY ingredient_id
            FOR UPDATE
            "#,
        )
        .bind(&ingredient_ids)
        .fetch_all(&mut *tx)
        .await?;

        let mut changes = Vec::with_capacity(requests.len());
        for request in &requests {
            changes.push(apply_in_tx(&mut tx, request, now).await?);
        }

        sqlx::query("UPDATE purchase_orders SET status = $2, received_at = $3 WHERE id = $1")
            .bind(order_id)
            .bind(PurchaseOrderStatus::Received.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        order.status = PurchaseOrderStatus::Received;
        order.received_at = Some(now);

        tracing::info!(order_id = %order_id, lines = changes.len(), "purchase order received");
        Ok(ReceiptResult { order, changes })
    }
}

fn to_order(row: OrderRow, line_items: Vec<PurchaseOrderLine>) -> AppResult<PurchaseOrder> {
    Ok(PurchaseOrder {
        id: row.id,
        supplier_id: row.supplier_id,
        status: row.status.parse()?,
        line_items,
        created_at: row.created_at,
        received_at: row.received_at,
    })
}

/// Lines of the given orders, grouped by order in line order
async fn fetch_lines<'e, E>(
    executor: E,
    order_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<PurchaseOrderLine>>>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, LineRow>(
        r#"
        SELECT purchase_order_id, ingredient_id, quantity, unit, unit_cost
        FROM purchase_order_lines
        WHERE purchase_order_id = ANY($1)
        ORDER BY purchase_order_id, line_no
        "#,
    )
    .bind(order_ids)
    .fetch_all(executor)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<PurchaseOrderLine>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.purchase_order_id)
            .or_default()
            .push(row.into());
    }
    Ok(grouped)
}

async fn fetch_catalog(
    tx: &mut Transaction<'_, Postgres>,
    ingredient_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Ingredient>> {
    let rows = sqlx::query_as::<_, IngredientRow>(&format!(
        "SELECT {} FROM ingredients WHERE id = ANY($1)",
        INGREDIENT_COLUMNS
    ))
    .bind(ingredient_ids)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.id, Ingredient::from(row)))
        .collect())
}
