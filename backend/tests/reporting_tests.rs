//! Stock report tests
//!
//! Tests for the stock reports served by the backend including:
//! - Daily activity zero-fill over the report window
//! - Consumption ranking with costs and tie order
//! - Reason breakdown buckets
//! - Timestamps arriving in every accepted shape

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::ledger::StockBook;
use shared::reporting::{build_report, daily_activity, top_consumption, DEFAULT_TOP_N};
use shared::timestamp::{to_instant, RawTimestamp};
use shared::transaction::StockChangeRequest;
use shared::{Ingredient, ReasonBucket, ReportWindow, StockLogEntry, StockReason};
use std::collections::HashMap;
use uuid::Uuid;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

fn ingredient(name: &str, unit: &str, cost: Decimal) -> Ingredient {
    Ingredient {
        id: Uuid::new_v4(),
        name: name.to_string(),
        unit: unit.to_string(),
        cost_per_unit: cost,
        min_stock_level: 0.0,
        max_stock_level: 0.0,
        supplier_id: None,
        created_at: at(1, 0),
        updated_at: at(1, 0),
    }
}

struct Week {
    beans: Ingredient,
    milk: Ingredient,
    catalog: HashMap<Uuid, Ingredient>,
    log: Vec<StockLogEntry>,
}

/// One week of café activity, with one entry before the window
fn week() -> Week {
    let beans = ingredient("Espresso Beans", "g", Decimal::new(3, 2));
    let milk = ingredient("Whole Milk", "mL", Decimal::new(2, 3));
    let barista = Uuid::new_v4();

    let mut book = StockBook::new();
    book.open(beans.id, 1000.0, at(1, 0)).unwrap();
    book.open(milk.id, 10_000.0, at(1, 0)).unwrap();

    let before_window = Utc.with_ymd_and_hms(2024, 2, 28, 9, 0, 0).unwrap();
    let mar2 = at(2, 10);
    let timestamps = [
        RawTimestamp::Text("2024-02-28T09:00:00Z".to_string()),
        RawTimestamp::Text("2024-03-01T08:00:00+00:00".to_string()),
        RawTimestamp::EpochMillis(mar2.timestamp_millis()),
        RawTimestamp::Provider {
            seconds: mar2.timestamp() + 3600,
            nanoseconds: 0,
        },
        RawTimestamp::Text("2024-03-03".to_string()),
        RawTimestamp::Text("2024-03-04T12:00:00Z".to_string()),
        RawTimestamp::Text("2024-03-05T12:00:00Z".to_string()),
        RawTimestamp::Text("2024-03-06T23:59:59Z".to_string()),
    ];
    let changes = [
        (beans.id, -999.0, StockReason::Consumption),
        (beans.id, 25_000.0, StockReason::Purchase),
        (beans.id, -1800.0, StockReason::Consumption),
        (milk.id, -2000.0, StockReason::Consumption),
        (milk.id, -500.0, StockReason::Waste),
        (beans.id, -200.0, StockReason::Expired),
        (beans.id, -100.0, StockReason::Adjustment),
        (milk.id, -300.0, StockReason::Correction),
    ];

    for (raw, (id, amount, reason)) in timestamps.iter().zip(changes) {
        let instant = to_instant(raw).unwrap();
        let request = StockChangeRequest::new(id, amount, reason, barista);
        book.apply(&request, instant).unwrap();
    }
    assert_eq!(book.log()[0].created_at, before_window);

    let catalog = [beans.clone(), milk.clone()]
        .into_iter()
        .map(|i| (i.id, i))
        .collect();
    Week {
        beans,
        milk,
        catalog,
        log: book.log().to_vec(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Test every day of the window appears, in order, zero-filled
    #[test]
    fn test_daily_activity_zero_fill() {
        let week = week();
        let window = ReportWindow::new(date(1), date(7)).unwrap();
        let points = daily_activity(&window, &week.log);

        let dates: Vec<_> = points.iter().map(|p| p.date).collect();
        assert_eq!(dates, (1..=7).map(date).collect::<Vec<_>>());

        let totals: Vec<_> = points.iter().map(|p| (p.added, p.removed)).collect();
        assert_eq!(
            totals,
            vec![
                (25_000.0, 0.0),
                (0.0, 3800.0),
                (0.0, 500.0),
                (0.0, 200.0),
                (0.0, 100.0),
                (0.0, 300.0),
                (0.0, 0.0),
            ]
        );
    }

    /// Test the full report over the week
    #[test]
    fn test_stock_report() {
        let week = week();
        let window = ReportWindow::new(date(1), date(7)).unwrap();
        let report = build_report(window, &week.log, &week.catalog, DEFAULT_TOP_N);

        assert_eq!(report.window, window);
        assert_eq!(report.daily_activity.len(), 7);

        // Milk: 2000 consumed + 300 corrected; beans: 1800 consumed + 100 adjusted
        assert_eq!(report.top_consumption.len(), 2);
        let milk = &report.top_consumption[0];
        assert_eq!(milk.ingredient_id, week.milk.id);
        assert_eq!(milk.ingredient_name.as_deref(), Some("Whole Milk"));
        assert_eq!(milk.total_consumed, 2300.0);
        assert_eq!(milk.cost, Some(Decimal::new(460, 2)));
        let beans = &report.top_consumption[1];
        assert_eq!(beans.ingredient_id, week.beans.id);
        assert_eq!(beans.total_consumed, 1900.0);
        assert_eq!(beans.cost, Some(Decimal::new(5700, 2)));

        let buckets: Vec<_> = report
            .reason_breakdown
            .iter()
            .map(|r| (r.bucket, r.total))
            .collect();
        assert_eq!(
            buckets,
            vec![
                (ReasonBucket::Consumption, 4100.0),
                (ReasonBucket::Waste, 500.0),
                (ReasonBucket::Expired, 200.0),
                (ReasonBucket::Adjustment, 100.0),
            ]
        );
    }

    /// Test entries outside the window are ignored
    #[test]
    fn test_window_excludes_other_days() {
        let week = week();
        let window = ReportWindow::new(date(3), date(3)).unwrap();
        let report = build_report(window, &week.log, &week.catalog, DEFAULT_TOP_N);

        assert_eq!(report.daily_activity.len(), 1);
        assert_eq!(report.daily_activity[0].removed, 500.0);
        // Only waste that day, which is not consumption
        assert!(report.top_consumption.is_empty());
        assert_eq!(report.reason_breakdown.len(), 1);
        assert_eq!(report.reason_breakdown[0].bucket, ReasonBucket::Waste);
    }

    /// Test equal totals rank by ingredient id and truncate to n
    #[test]
    fn test_top_consumption_ties() {
        let a = ingredient("Oat Milk", "mL", Decimal::ZERO);
        let b = ingredient("Soy Milk", "mL", Decimal::ZERO);
        let entries: Vec<StockLogEntry> = [a.id, b.id]
            .into_iter()
            .map(|id| StockLogEntry {
                id: Uuid::new_v4(),
                ingredient_id: id,
                change_amount: -750.0,
                reason: StockReason::Consumption,
                user_id: Uuid::new_v4(),
                created_at: at(2, 9),
            })
            .collect();
        let catalog: HashMap<Uuid, Ingredient> =
            [a.clone(), b.clone()].into_iter().map(|i| (i.id, i)).collect();
        let window = ReportWindow::new(date(1), date(7)).unwrap();

        let ranked = top_consumption(&window, &entries, &catalog, 5);
        let first = a.id.min(b.id);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].ingredient_id, first);

        let top_one = top_consumption(&window, &entries, &catalog, 1);
        assert_eq!(top_one.len(), 1);
        assert_eq!(top_one[0].ingredient_id, first);
    }

    /// Test an ingredient missing from the catalog still ranks, unnamed
    #[test]
    fn test_top_consumption_unknown_ingredient() {
        let entry = StockLogEntry {
            id: Uuid::new_v4(),
            ingredient_id: Uuid::new_v4(),
            change_amount: -10.0,
            reason: StockReason::Consumption,
            user_id: Uuid::new_v4(),
            created_at: at(4, 9),
        };
        let window = ReportWindow::new(date(1), date(7)).unwrap();
        let ranked = top_consumption(&window, &[entry], &HashMap::new(), 5);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].ingredient_name, None);
        assert_eq!(ranked[0].cost, None);
    }

    /// Test an empty log still yields a zero-filled chart
    #[test]
    fn test_empty_log() {
        let window = ReportWindow::trailing(date(7), 7);
        let report = build_report(window, &[], &HashMap::new(), DEFAULT_TOP_N);

        assert_eq!(report.daily_activity.len(), 7);
        assert!(report
            .daily_activity
            .iter()
            .all(|p| p.added == 0.0 && p.removed == 0.0));
        assert!(report.top_consumption.is_empty());
        assert!(report.reason_breakdown.is_empty());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Removed totals agree between the daily chart and the reason breakdown
        #[test]
        fn prop_daily_and_reason_totals_agree(
            removals in prop::collection::vec((1u32..=7, 1.0f64..1000.0), 0..30)
        ) {
            let id = Uuid::new_v4();
            let entries: Vec<StockLogEntry> = removals
                .iter()
                .map(|(day, amount)| StockLogEntry {
                    id: Uuid::new_v4(),
                    ingredient_id: id,
                    change_amount: -amount,
                    reason: StockReason::Consumption,
                    user_id: Uuid::new_v4(),
                    created_at: at(*day, 12),
                })
                .collect();
            let window = ReportWindow::new(date(1), date(7)).unwrap();
            let report = build_report(window, &entries, &HashMap::new(), DEFAULT_TOP_N);

            prop_assert_eq!(report.daily_activity.len(), 7);
            let daily: f64 = report.daily_activity.iter().map(|p| p.removed).sum();
            let by_reason: f64 = report.reason_breakdown.iter().map(|r| r.total).sum();
            prop_assert!(shared::conversion::approx_eq(daily, by_reason));
        }
    }
}
