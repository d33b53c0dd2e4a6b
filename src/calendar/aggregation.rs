//! Ledger aggregation for the calendar and statistics views.
//!
//! Provides functions to bucket spend events by day, total a month against
//! its budget, break spending down by category, and build the day-over-day
//! trend for bar-chart rendering. All functions are pure reducers over a
//! slice of ledger items; only `spent` events count as spending.

use std::collections::HashMap;

use serde::Serialize;
use time::{Date, Duration, Month, UtcOffset, util::days_in_year_month};

use crate::{
    ledger::{Category, SpendItem, SpendKind},
    timezone::local_date,
};

/// How a day's spending compares to the daily budget.
///
/// The same three-tier rule colors both the calendar dots and the trend
/// bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Nothing was spent.
    None,
    /// Under 80 percent of the daily budget.
    Under,
    /// Between 80 and 100 percent of the daily budget.
    Near,
    /// Over the daily budget.
    Over,
}

/// The spend events and their total for one day of the month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBucket {
    /// The sum of the day's spend amounts.
    pub total: i64,
    /// The day's spend events, newest first.
    pub items: Vec<SpendItem>,
}

/// The month's spending measured against its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    /// Total spent in the month so far.
    pub total_spent: i64,
    /// The monthly budget minus the total spent. Negative when the budget
    /// is blown.
    pub remaining_budget: i64,
    /// How much of the budget is used, as a whole percentage. Zero when no
    /// budget is set. May exceed 100.
    pub progress_pct: i64,
}

/// One category's share of the period's spending.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category.
    pub category: Category,
    /// The category's total spend.
    pub total: i64,
    /// The category's share of the period total, in percent with one
    /// decimal place.
    pub percentage: f64,
}

/// One bar of the day-over-day trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendBar {
    /// The bar's local date, as YYYY-MM-DD.
    pub date: String,
    /// The day's total spend.
    pub total: i64,
    /// The bar's color tier, by the same rule as the calendar dots.
    pub status: DayStatus,
}

/// Classify a day's spending against the daily budget.
pub fn day_status(total: i64, daily_budget: i64) -> DayStatus {
    if total == 0 {
        return DayStatus::None;
    }
    if daily_budget <= 0 {
        // Any spending with no budget to measure against counts as over.
        return DayStatus::Over;
    }

    let pct = total * 100 / daily_budget;
    if pct < 80 {
        DayStatus::Under
    } else if pct <= 100 {
        DayStatus::Near
    } else {
        DayStatus::Over
    }
}

/// Bucket spend events by day of month.
///
/// Only items with [SpendKind::Spent] whose event time falls in the given
/// local month are included; days without spending have no entry.
pub fn spent_by_day(
    items: &[SpendItem],
    year: i32,
    month: Month,
    offset: UtcOffset,
) -> HashMap<u8, DayBucket> {
    let mut buckets: HashMap<u8, DayBucket> = HashMap::new();

    for item in items {
        if item.kind != SpendKind::Spent {
            continue;
        }

        let date = local_date(item.timestamp, offset);
        if date.year() != year || date.month() != month {
            continue;
        }

        let bucket = buckets.entry(date.day()).or_insert_with(|| DayBucket {
            total: 0,
            items: Vec::new(),
        });
        bucket.total += item.amount;
        bucket.items.push(item.clone());
    }

    buckets
}

/// Total a month's spending against its budget.
///
/// `month_items` must already be restricted to the month; only items with
/// [SpendKind::Spent] count.
pub fn month_summary(month_items: &[SpendItem], monthly_budget: i64) -> MonthSummary {
    let total_spent: i64 = month_items
        .iter()
        .filter(|item| item.kind == SpendKind::Spent)
        .map(|item| item.amount)
        .sum();

    let progress_pct = if monthly_budget <= 0 {
        0
    } else {
        total_spent * 100 / monthly_budget
    };

    MonthSummary {
        total_spent,
        remaining_budget: monthly_budget - total_spent,
        progress_pct,
    }
}

/// Break the period's spending down by category, largest first.
///
/// Each entry carries its share of the period total as a percentage with
/// one decimal place. Only items with [SpendKind::Spent] count.
pub fn category_totals(items: &[SpendItem]) -> Vec<CategoryTotal> {
    let mut totals: HashMap<Category, i64> = HashMap::new();

    for item in items.iter().filter(|item| item.kind == SpendKind::Spent) {
        *totals.entry(item.category).or_insert(0) += item.amount;
    }

    let period_total: i64 = totals.values().sum();

    let mut breakdown: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| {
            let percentage = if period_total == 0 {
                0.0
            } else {
                (total as f64 * 1000.0 / period_total as f64).round() / 10.0
            };
            CategoryTotal {
                category,
                total,
                percentage,
            }
        })
        .collect();

    // Largest first; ties broken by label so the order is stable.
    breakdown.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category.as_str().cmp(b.category.as_str()))
    });

    breakdown
}

/// Build the day-over-day trend for the `days` most recent days ending at
/// `end`, oldest first.
///
/// Each bar is colored by the same ratio rule as the calendar dots, using
/// the daily budget of the month the bar falls in.
pub fn daily_trend(
    items: &[SpendItem],
    end: Date,
    days: u16,
    monthly_budget: i64,
    offset: UtcOffset,
) -> Vec<TrendBar> {
    let mut totals_by_date: HashMap<Date, i64> = HashMap::new();

    for item in items.iter().filter(|item| item.kind == SpendKind::Spent) {
        *totals_by_date
            .entry(local_date(item.timestamp, offset))
            .or_insert(0) += item.amount;
    }

    (0..days)
        .rev()
        .filter_map(|back| end.checked_sub(Duration::days(back as i64)))
        .map(|date| {
            let total = totals_by_date.get(&date).copied().unwrap_or(0);
            let daily_budget =
                monthly_budget / days_in_year_month(date.year(), date.month()) as i64;

            TrendBar {
                date: date.to_string(),
                total,
                status: day_status(total, daily_budget),
            }
        })
        .collect()
}
