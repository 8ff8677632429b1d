//! In-memory stock ledger
//!
//! Holds stock records next to their append-only log and commits evaluator
//! output so that a balance and its log entry always change together. The
//! backend does the same inside a database transaction; this ledger serves
//! offline previews and tests.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::conversion::approx_eq;
use crate::error::{StockError, StockResult};
use crate::models::{Ingredient, PurchaseOrder, PurchaseOrderStatus, StockLogEntry, StockRecord};
use crate::transaction::{evaluate, plan_receipt, reconstruct_balance, EvaluatedChange, StockChangeRequest};
use crate::units::UnitRegistry;

#[derive(Debug, Default, Clone)]
pub struct StockBook {
    records: HashMap<Uuid, StockRecord>,
    baselines: HashMap<Uuid, f64>,
    log: Vec<StockLogEntry>,
}

impl StockBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking an ingredient at `baseline`; existing records are kept
    pub fn open(&mut self, ingredient_id: Uuid, baseline: f64, now: DateTime<Utc>) -> StockResult<&StockRecord> {
        if !baseline.is_finite() || baseline < 0.0 {
            return Err(StockError::InvalidAmount(format!(
                "baseline {} must be a non-negative number",
                baseline
            )));
        }
        self.baselines.entry(ingredient_id).or_insert(baseline);
        Ok(self
            .records
            .entry(ingredient_id)
            .or_insert_with(|| StockRecord::new(ingredient_id, baseline, now)))
    }

    pub fn record(&self, ingredient_id: Uuid) -> Option<&StockRecord> {
        self.records.get(&ingredient_id)
    }

    pub fn quantity(&self, ingredient_id: Uuid) -> Option<f64> {
        self.record(ingredient_id).map(|r| r.quantity)
    }

    pub fn log(&self) -> &[StockLogEntry] {
        &self.log
    }

    pub fn entries_for(&self, ingredient_id: Uuid) -> impl Iterator<Item = &StockLogEntry> {
        self.log
            .iter()
            .filter(move |entry| entry.ingredient_id == ingredient_id)
    }

    /// Evaluate and commit one change
    pub fn apply(&mut self, request: &StockChangeRequest, now: DateTime<Utc>) -> StockResult<EvaluatedChange> {
        let current = self
            .quantity(request.ingredient_id)
            .ok_or(StockError::IngredientNotFound(request.ingredient_id))?;
        let change = evaluate(request, current, now)?;
        self.commit(&change);
        Ok(change)
    }

    /// Evaluate every request against running balances, then commit all or none
    pub fn apply_batch(
        &mut self,
        requests: &[StockChangeRequest],
        now: DateTime<Utc>,
    ) -> StockResult<Vec<EvaluatedChange>> {
        let mut running: HashMap<Uuid, f64> = HashMap::new();
        let mut changes = Vec::with_capacity(requests.len());

        for request in requests {
            let current = match running.get(&request.ingredient_id) {
                Some(quantity) => *quantity,
                None => self
                    .quantity(request.ingredient_id)
                    .ok_or(StockError::IngredientNotFound(request.ingredient_id))?,
            };
            let change = evaluate(request, current, now)?;
            running.insert(request.ingredient_id, change.new_quantity);
            changes.push(change);
        }

        for change in &changes {
            self.commit(change);
        }
        Ok(changes)
    }

    /// Receive a purchase order as one multi-entry transaction
    pub fn receive(
        &mut self,
        registry: &UnitRegistry,
        order: &mut PurchaseOrder,
        catalog: &HashMap<Uuid, Ingredient>,
        actor_id: Uuid,
        now: DateTime<Utc>,
    ) -> StockResult<Vec<EvaluatedChange>> {
        let requests = plan_receipt(registry, order, catalog, actor_id)?;
        let changes = self.apply_batch(&requests, now)?;
        order.status = PurchaseOrderStatus::Received;
        order.received_at = Some(now);
        tracing::debug!(order_id = %order.id, lines = changes.len(), "purchase order received");
        Ok(changes)
    }

    /// Whether baseline plus the log equals the stored balance
    pub fn verify(&self, ingredient_id: Uuid) -> bool {
        match (self.baselines.get(&ingredient_id), self.record(ingredient_id)) {
            (Some(baseline), Some(record)) => approx_eq(
                reconstruct_balance(*baseline, ingredient_id, &self.log),
                record.quantity,
            ),
            _ => false,
        }
    }

    fn commit(&mut self, change: &EvaluatedChange) {
        let entry = &change.entry;
        if let Some(record) = self.records.get_mut(&entry.ingredient_id) {
            record.quantity = change.new_quantity;
            record.last_updated = entry.created_at;
        }
        tracing::debug!(
            ingredient_id = %entry.ingredient_id,
            change = entry.change_amount,
            reason = %entry.reason,
            balance = change.new_quantity,
            "stock change committed"
        );
        self.log.push(entry.clone());
    }
}
