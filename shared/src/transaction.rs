//! Stock transaction evaluation
//!
//! The evaluator is pure: it decides the new balance and builds the log entry,
//! but committing both is left to the caller's persistence layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::conversion::{ensure_unit_type, to_base};
use crate::error::{StockError, StockResult};
use crate::models::{ChangeDirection, Ingredient, PurchaseOrder, StockLogEntry, StockReason};
use crate::units::UnitRegistry;

/// Balances closer to zero than this are float residue
pub const ZERO_EPSILON: f64 = 1e-9;

/// A requested stock change, already in base units
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockChangeRequest {
    pub ingredient_id: Uuid,
    /// Positive adds stock, negative removes it
    pub change_amount: f64,
    pub reason: StockReason,
    pub actor_id: Uuid,
}

impl StockChangeRequest {
    pub fn new(ingredient_id: Uuid, change_amount: f64, reason: StockReason, actor_id: Uuid) -> Self {
        Self {
            ingredient_id,
            change_amount,
            reason,
            actor_id,
        }
    }

    /// Build a request from a signed human quantity such as `(-2, "kg")`
    pub fn from_quantity(
        registry: &UnitRegistry,
        ingredient: &Ingredient,
        amount: f64,
        unit: &str,
        reason: StockReason,
        actor_id: Uuid,
    ) -> StockResult<Self> {
        let unit_type = ingredient.unit_type(registry)?;
        ensure_unit_type(registry, unit, unit_type)?;
        let change_amount = to_base(registry, amount, unit)?;
        Ok(Self::new(ingredient.id, change_amount, reason, actor_id))
    }
}

/// Outcome of an accepted change, ready to be committed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluatedChange {
    pub previous_quantity: f64,
    pub new_quantity: f64,
    pub entry: StockLogEntry,
}

/// Check that a change amount is usable for its reason
pub fn validate_change(change_amount: f64, reason: StockReason) -> StockResult<()> {
    if !change_amount.is_finite() {
        return Err(StockError::InvalidChangeAmount(format!(
            "{} is not finite",
            change_amount
        )));
    }
    if change_amount == 0.0 {
        return Err(StockError::InvalidChangeAmount(
            "change amount must be non-zero".to_string(),
        ));
    }
    match (reason.direction(), change_amount > 0.0) {
        (ChangeDirection::Increase, false) => Err(StockError::InvalidChangeAmount(format!(
            "{} must add stock",
            reason
        ))),
        (ChangeDirection::Decrease, true) => Err(StockError::InvalidChangeAmount(format!(
            "{} must remove stock",
            reason
        ))),
        _ => Ok(()),
    }
}

/// Decide the result of applying `request` to `current_quantity`
///
/// Rejected changes produce no log entry.
pub fn evaluate(
    request: &StockChangeRequest,
    current_quantity: f64,
    now: DateTime<Utc>,
) -> StockResult<EvaluatedChange> {
    validate_change(request.change_amount, request.reason)?;
    if !current_quantity.is_finite() || current_quantity < 0.0 {
        return Err(StockError::InvalidAmount(format!(
            "current stock {} is not a valid balance",
            current_quantity
        )));
    }

    let mut new_quantity = current_quantity + request.change_amount;
    if new_quantity.abs() < ZERO_EPSILON {
        new_quantity = 0.0;
    }
    if new_quantity < 0.0 {
        return Err(StockError::InsufficientStock {
            ingredient_id: request.ingredient_id,
            available: current_quantity,
            requested: -request.change_amount,
        });
    }

    Ok(EvaluatedChange {
        previous_quantity: current_quantity,
        new_quantity,
        entry: StockLogEntry {
            id: Uuid::new_v4(),
            ingredient_id: request.ingredient_id,
            change_amount: request.change_amount,
            reason: request.reason,
            user_id: request.actor_id,
            created_at: now,
        },
    })
}

/// Fold log entries onto a baseline
pub fn replay<'a>(baseline: f64, entries: impl IntoIterator<Item = &'a StockLogEntry>) -> f64 {
    entries
        .into_iter()
        .fold(baseline, |balance, entry| balance + entry.change_amount)
}

/// Balance of one ingredient reconstructed from a mixed log
pub fn reconstruct_balance<'a>(
    baseline: f64,
    ingredient_id: Uuid,
    entries: impl IntoIterator<Item = &'a StockLogEntry>,
) -> f64 {
    replay(
        baseline,
        entries
            .into_iter()
            .filter(|entry| entry.ingredient_id == ingredient_id),
    )
}

/// Turn a purchase order into one `purchase` request per line
///
/// Every missing ingredient is collected before failing, so the caller can
/// report them together and leave the order unreceived.
pub fn plan_receipt(
    registry: &UnitRegistry,
    order: &PurchaseOrder,
    catalog: &HashMap<Uuid, Ingredient>,
    actor_id: Uuid,
) -> StockResult<Vec<StockChangeRequest>> {
    if !order.status.can_receive() {
        return Err(StockError::InvalidOrderState {
            order_id: order.id,
            status: order.status,
        });
    }

    let mut missing: Vec<Uuid> = order
        .line_items
        .iter()
        .map(|line| line.ingredient_id)
        .filter(|id| !catalog.contains_key(id))
        .collect();
    if !missing.is_empty() {
        missing.sort();
        missing.dedup();
        return Err(StockError::PartialBatchFailure {
            order_id: order.id,
            missing,
        });
    }

    order
        .line_items
        .iter()
        .map(|line| {
            let ingredient = catalog
                .get(&line.ingredient_id)
                .ok_or(StockError::IngredientNotFound(line.ingredient_id))?;
            if !(line.quantity > 0.0) {
                return Err(StockError::InvalidChangeAmount(format!(
                    "line for {} orders {}",
                    ingredient.name, line.quantity
                )));
            }
            StockChangeRequest::from_quantity(
                registry,
                ingredient,
                line.quantity,
                &line.unit,
                StockReason::Purchase,
                actor_id,
            )
        })
        .collect()
}
