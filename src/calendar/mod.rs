//! The calendar and statistics views over the spend ledger.
//!
//! This module contains:
//! - Aggregation of ledger items into per-day buckets, month totals,
//!   category breakdowns, and the day-over-day trend
//! - The navigation cursor tracking the displayed month and selected day
//! - Route handlers for the calendar and statistics API

mod aggregation;
mod handlers;
mod navigation;

pub use aggregation::{
    CategoryTotal, DayBucket, DayStatus, MonthSummary, TrendBar, category_totals, daily_trend,
    day_status, month_summary, spent_by_day,
};
pub use handlers::{
    month_view_endpoint, select_day_endpoint, statistics_endpoint, step_month_endpoint,
};
pub use navigation::CalendarCursor;
