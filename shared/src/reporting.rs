//! Stock report aggregation for dashboard charts
//!
//! Pure functions of a window, a slice of log entries and the ingredient
//! catalog. Entries dated outside the window are ignored.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::models::{
    ConsumptionRank, DailyActivityPoint, Ingredient, ReasonBucket, ReasonTotal, StockLogEntry,
    StockReport,
};
use crate::types::ReportWindow;

/// Ranking length when the caller does not ask for one
pub const DEFAULT_TOP_N: usize = 5;

fn in_window<'a>(
    window: &'a ReportWindow,
    entries: &'a [StockLogEntry],
) -> impl Iterator<Item = &'a StockLogEntry> + 'a {
    entries
        .iter()
        .filter(move |entry| window.contains_instant(&entry.created_at))
}

/// Added and removed totals per day, zero-filled
pub fn daily_activity(window: &ReportWindow, entries: &[StockLogEntry]) -> Vec<DailyActivityPoint> {
    let mut by_day: BTreeMap<NaiveDate, DailyActivityPoint> = window
        .days()
        .map(|date| {
            (
                date,
                DailyActivityPoint {
                    date,
                    added: 0.0,
                    removed: 0.0,
                },
            )
        })
        .collect();

    for entry in in_window(window, entries) {
        if let Some(point) = by_day.get_mut(&entry.created_at.date_naive()) {
            if entry.is_addition() {
                point.added += entry.change_amount;
            } else if entry.is_removal() {
                point.removed += entry.change_amount.abs();
            }
        }
    }

    by_day.into_values().collect()
}

/// Ingredients ranked by how much was used, excluding waste and expiry
pub fn top_consumption(
    window: &ReportWindow,
    entries: &[StockLogEntry],
    catalog: &HashMap<Uuid, Ingredient>,
    n: usize,
) -> Vec<ConsumptionRank> {
    let mut totals: HashMap<Uuid, f64> = HashMap::new();
    for entry in in_window(window, entries) {
        if entry.is_removal() && !entry.reason.is_loss() {
            *totals.entry(entry.ingredient_id).or_insert(0.0) += entry.change_amount.abs();
        }
    }

    let mut ranked: Vec<(Uuid, f64)> = totals.into_iter().collect();
    ranked.sort_by(|(a_id, a_total), (b_id, b_total)| {
        b_total.total_cmp(a_total).then_with(|| a_id.cmp(b_id))
    });
    ranked.truncate(n);

    ranked
        .into_iter()
        .map(|(ingredient_id, total_consumed)| {
            let ingredient = catalog.get(&ingredient_id);
            ConsumptionRank {
                ingredient_id,
                ingredient_name: ingredient.map(|i| i.name.clone()),
                unit: ingredient.map(|i| i.unit.clone()),
                total_consumed,
                cost: ingredient.and_then(|i| consumption_cost(i, total_consumed)),
            }
        })
        .collect()
}

fn consumption_cost(ingredient: &Ingredient, total: f64) -> Option<Decimal> {
    Decimal::try_from(total)
        .ok()
        .map(|quantity| (quantity * ingredient.cost_per_unit).round_dp(2))
}

/// Removed quantity per reason bucket; empty buckets are omitted
pub fn reason_breakdown(window: &ReportWindow, entries: &[StockLogEntry]) -> Vec<ReasonTotal> {
    let mut totals: HashMap<ReasonBucket, f64> = HashMap::new();
    for entry in in_window(window, entries) {
        if entry.is_removal() {
            *totals
                .entry(ReasonBucket::for_reason(entry.reason))
                .or_insert(0.0) += entry.change_amount.abs();
        }
    }

    ReasonBucket::ALL
        .into_iter()
        .filter_map(|bucket| {
            totals
                .get(&bucket)
                .filter(|total| **total > 0.0)
                .map(|total| ReasonTotal {
                    bucket,
                    total: *total,
                })
        })
        .collect()
}

/// All three projections for one window
pub fn build_report(
    window: ReportWindow,
    entries: &[StockLogEntry],
    catalog: &HashMap<Uuid, Ingredient>,
    top_n: usize,
) -> StockReport {
    StockReport {
        daily_activity: daily_activity(&window, entries),
        top_consumption: top_consumption(&window, entries, catalog, top_n),
        reason_breakdown: reason_breakdown(&window, entries),
        window,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StockReason;
    use chrono::{TimeZone, Utc};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn entry(ingredient_id: Uuid, d: u32, change: f64, reason: StockReason) -> StockLogEntry {
        StockLogEntry {
            id: Uuid::new_v4(),
            ingredient_id,
            change_amount: change,
            reason,
            user_id: Uuid::nil(),
            created_at: Utc.with_ymd_and_hms(2024, 5, d, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_daily_activity_zero_fills_gaps() {
        let id = Uuid::new_v4();
        let window = ReportWindow::new(day(1), day(3)).unwrap();
        let log = vec![
            entry(id, 1, 500.0, StockReason::Purchase),
            entry(id, 1, -200.0, StockReason::Consumption),
            entry(id, 3, -50.0, StockReason::Waste),
        ];

        let series = daily_activity(&window, &log);
        assert_eq!(series.len(), 3);
        assert_eq!(series[0], DailyActivityPoint { date: day(1), added: 500.0, removed: 200.0 });
        assert_eq!(series[1], DailyActivityPoint { date: day(2), added: 0.0, removed: 0.0 });
        assert_eq!(series[2], DailyActivityPoint { date: day(3), added: 0.0, removed: 50.0 });
    }

    #[test]
    fn test_daily_activity_ignores_entries_outside_window() {
        let id = Uuid::new_v4();
        let window = ReportWindow::new(day(2), day(2)).unwrap();
        let log = vec![entry(id, 1, 10.0, StockReason::Purchase), entry(id, 3, -1.0, StockReason::Consumption)];
        let series = daily_activity(&window, &log);
        assert_eq!(series, vec![DailyActivityPoint { date: day(2), added: 0.0, removed: 0.0 }]);
    }

    #[test]
    fn test_top_consumption_excludes_losses_and_breaks_ties_by_id() {
        let mut ids = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        ids.sort();
        let [low_id, high_id, wasted] = ids;
        let window = ReportWindow::new(day(1), day(5)).unwrap();
        let log = vec![
            entry(high_id, 1, -300.0, StockReason::Consumption),
            entry(low_id, 2, -300.0, StockReason::Consumption),
            entry(wasted, 2, -900.0, StockReason::Waste),
            entry(wasted, 3, -900.0, StockReason::Expired),
            entry(wasted, 3, 5000.0, StockReason::Purchase),
        ];

        let ranking = top_consumption(&window, &log, &HashMap::new(), DEFAULT_TOP_N);
        let order: Vec<_> = ranking.iter().map(|r| r.ingredient_id).collect();
        assert_eq!(order, vec![low_id, high_id]);
        assert!(ranking.iter().all(|r| r.ingredient_name.is_none()));
    }

    #[test]
    fn test_top_consumption_truncates() {
        let window = ReportWindow::new(day(1), day(1)).unwrap();
        let log: Vec<_> = (1..=8)
            .map(|n| entry(Uuid::new_v4(), 1, -(n as f64), StockReason::Consumption))
            .collect();
        let ranking = top_consumption(&window, &log, &HashMap::new(), 5);
        assert_eq!(ranking.len(), 5);
        assert_eq!(ranking[0].total_consumed, 8.0);
        assert_eq!(ranking[4].total_consumed, 4.0);
        assert!(top_consumption(&window, &log, &HashMap::new(), 0).is_empty());
    }

    #[test]
    fn test_top_consumption_uses_catalog() {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let catalog: HashMap<_, _> = [(
            id,
            Ingredient {
                id,
                name: "Oat Milk".to_string(),
                unit: "mL".to_string(),
                cost_per_unit: Decimal::new(5, 3),
                min_stock_level: 0.0,
                max_stock_level: 0.0,
                supplier_id: None,
                created_at: now,
                updated_at: now,
            },
        )]
        .into();
        let window = ReportWindow::new(day(1), day(1)).unwrap();
        let log = vec![entry(id, 1, -2000.0, StockReason::Consumption)];

        let ranking = top_consumption(&window, &log, &catalog, DEFAULT_TOP_N);
        assert_eq!(ranking[0].ingredient_name.as_deref(), Some("Oat Milk"));
        assert_eq!(ranking[0].cost, Some(Decimal::new(1000, 2)));
    }

    #[test]
    fn test_reason_breakdown_buckets() {
        let id = Uuid::new_v4();
        let window = ReportWindow::new(day(1), day(2)).unwrap();
        let log = vec![
            entry(id, 1, -100.0, StockReason::Consumption),
            entry(id, 1, -20.0, StockReason::Correction),
            entry(id, 2, -30.0, StockReason::Expired),
            entry(id, 2, 40.0, StockReason::Adjustment),
        ];

        let breakdown = reason_breakdown(&window, &log);
        assert_eq!(
            breakdown,
            vec![
                ReasonTotal { bucket: ReasonBucket::Consumption, total: 120.0 },
                ReasonTotal { bucket: ReasonBucket::Expired, total: 30.0 },
            ]
        );
    }

    #[test]
    fn test_build_report_empty_log() {
        let window = ReportWindow::new(day(1), day(7)).unwrap();
        let report = build_report(window, &[], &HashMap::new(), DEFAULT_TOP_N);
        assert_eq!(report.daily_activity.len(), 7);
        assert!(report.top_consumption.is_empty());
        assert!(report.reason_breakdown.is_empty());
    }
}
