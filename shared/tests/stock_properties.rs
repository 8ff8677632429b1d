//! Stock model tests
//!
//! Tests for the stock core including:
//! - Unit round-trip through base units
//! - Balance reconstruction from the stock log
//! - Non-negative balances
//! - Espresso Beans restock/usage scenario

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::conversion::{approx_eq, from_base, to_base};
use shared::ledger::StockBook;
use shared::transaction::{reconstruct_balance, StockChangeRequest};
use shared::{classify, Ingredient, InventoryStatus, StockError, StockReason, UnitRegistry};
use uuid::Uuid;

fn espresso_beans() -> Ingredient {
    let now = Utc::now();
    Ingredient {
        id: Uuid::new_v4(),
        name: "Espresso Beans".to_string(),
        unit: "g".to_string(),
        cost_per_unit: Decimal::new(3, 2),
        min_stock_level: 1000.0,
        max_stock_level: 10_000.0,
        supplier_id: None,
        created_at: now,
        updated_at: now,
    }
}

// ============================================================================
// Scenario Tests
// ============================================================================

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_restock_then_consume() {
        let registry = UnitRegistry::standard();
        let beans = espresso_beans();
        let barista = Uuid::new_v4();
        let now = Utc::now();
        let mut book = StockBook::new();
        book.open(beans.id, 5000.0, now).unwrap();

        let restock = StockChangeRequest::from_quantity(
            registry,
            &beans,
            25.0,
            "kg",
            StockReason::Purchase,
            barista,
        )
        .unwrap();
        assert_eq!(restock.change_amount, 25_000.0);
        let applied = book.apply(&restock, now).unwrap();
        assert_eq!(applied.new_quantity, 30_000.0);

        let usage = StockChangeRequest::from_quantity(
            registry,
            &beans,
            -18_000.0,
            "g",
            StockReason::Consumption,
            barista,
        )
        .unwrap();
        let applied = book.apply(&usage, now).unwrap();
        assert_eq!(applied.new_quantity, 12_000.0);

        assert_eq!(book.quantity(beans.id), Some(12_000.0));
        assert_eq!(book.entries_for(beans.id).count(), 2);
        assert_eq!(
            classify(12_000.0, beans.min_stock_level, beans.max_stock_level),
            InventoryStatus::Good
        );
        assert!(book.verify(beans.id));
    }

    #[test]
    fn test_insufficient_stock_leaves_state_untouched() {
        let registry = UnitRegistry::standard();
        let beans = espresso_beans();
        let now = Utc::now();
        let mut book = StockBook::new();
        book.open(beans.id, 500.0, now).unwrap();

        let usage = StockChangeRequest::from_quantity(
            registry,
            &beans,
            -600.0,
            "g",
            StockReason::Consumption,
            Uuid::new_v4(),
        )
        .unwrap();

        assert!(matches!(
            book.apply(&usage, now),
            Err(StockError::InsufficientStock { .. })
        ));
        assert_eq!(book.quantity(beans.id), Some(500.0));
        assert_eq!(book.log().len(), 0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn unit_strategy() -> impl Strategy<Value = String> {
        let symbols: Vec<String> = UnitRegistry::standard()
            .all()
            .iter()
            .map(|u| u.symbol.clone())
            .collect();
        prop::sample::select(symbols)
    }

    fn change_strategy() -> impl Strategy<Value = (f64, StockReason)> {
        prop_oneof![
            (1.0f64..5000.0).prop_map(|a| (a, StockReason::Purchase)),
            (1.0f64..5000.0).prop_map(|a| (-a, StockReason::Consumption)),
            (1.0f64..500.0).prop_map(|a| (-a, StockReason::Waste)),
            (-500.0f64..500.0)
                .prop_filter("non-zero", |a| *a != 0.0)
                .prop_map(|a| (a, StockReason::Adjustment)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Converting into base units and back recovers the amount
        #[test]
        fn prop_unit_round_trip(amount in 0.0f64..1_000_000.0, unit in unit_strategy()) {
            let registry = UnitRegistry::standard();
            let base = to_base(registry, amount, &unit).unwrap();
            let back = from_base(registry, base, &unit).unwrap();
            prop_assert!(approx_eq(back, amount), "{} {} came back as {}", amount, unit, back);
        }

        /// Final balance equals baseline plus every accepted change
        #[test]
        fn prop_balance_reconstruction(
            baseline in 0.0f64..10_000.0,
            changes in prop::collection::vec(change_strategy(), 1..40)
        ) {
            let id = Uuid::new_v4();
            let actor = Uuid::new_v4();
            let now = Utc::now();
            let mut book = StockBook::new();
            book.open(id, baseline, now).unwrap();

            let mut accepted = 0.0;
            for (amount, reason) in changes {
                let request = StockChangeRequest::new(id, amount, reason, actor);
                if let Ok(change) = book.apply(&request, now) {
                    accepted += change.entry.change_amount;
                }
            }

            let final_quantity = book.quantity(id).unwrap();
            prop_assert!(approx_eq(final_quantity, baseline + accepted));
            prop_assert!(approx_eq(
                final_quantity,
                reconstruct_balance(baseline, id, book.log())
            ));
        }

        /// No sequence of changes drives stock below zero
        #[test]
        fn prop_never_negative(
            baseline in 0.0f64..1_000.0,
            changes in prop::collection::vec(change_strategy(), 1..40)
        ) {
            let id = Uuid::new_v4();
            let mut book = StockBook::new();
            book.open(id, baseline, Utc::now()).unwrap();

            for (amount, reason) in changes {
                let before = book.quantity(id).unwrap();
                let log_len = book.log().len();
                let request = StockChangeRequest::new(id, amount, reason, Uuid::new_v4());
                match book.apply(&request, Utc::now()) {
                    Ok(_) => prop_assert!(book.quantity(id).unwrap() >= 0.0),
                    Err(StockError::InsufficientStock { .. }) => {
                        prop_assert_eq!(book.quantity(id).unwrap(), before);
                        prop_assert_eq!(book.log().len(), log_len);
                    }
                    Err(other) => prop_assert!(false, "unexpected error {:?}", other),
                }
            }
        }

        /// Classification follows the par-level thresholds
        #[test]
        fn prop_classification_thresholds(quantity in -100.0f64..10_000.0, min in 0.0f64..5_000.0) {
            let status = classify(quantity, min, 10_000.0);
            let expected = if quantity <= 0.0 {
                InventoryStatus::OutOfStock
            } else if quantity <= min {
                InventoryStatus::Low
            } else {
                InventoryStatus::Good
            };
            prop_assert_eq!(status, expected);
        }
    }
}
