//! Calendar and statistics HTTP handlers.
//!
//! This module contains:
//! - The month view handler feeding the calendar grid
//! - The day selection and month stepping handlers that drive the cursor
//! - The statistics handler feeding the category breakdown and trend chart

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Month, UtcOffset};

use crate::{
    AppState, Error,
    app_state::lock_database,
    calendar::{
        CalendarCursor, CategoryTotal, DayStatus, MonthSummary, TrendBar, category_totals,
        daily_trend, day_status, month_summary, spent_by_day,
    },
    ledger::{SpendItem, list_all_items, list_items_for_month},
    preferences::monthly_variable_budget,
    timezone::{local_offset_or_utc, month_from_number, today},
};

/// How many days the trend chart covers.
const TREND_DAYS: u16 = 7;

/// The state needed by the calendar handlers.
#[derive(Clone)]
pub struct CalendarState {
    /// The database connection for the ledger.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name.
    pub local_timezone: String,
    /// The displayed month and selected day.
    pub cursor: Arc<Mutex<CalendarCursor>>,
}

impl FromRef<AppState> for CalendarState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            cursor: state.calendar_cursor.clone(),
        }
    }
}

/// One cell of the calendar grid.
#[derive(Debug, Serialize)]
pub struct CalendarDayView {
    /// The day of the month.
    pub day: u8,
    /// The day's total spend.
    pub total: i64,
    /// How many spend events the day has.
    pub item_count: usize,
    /// The day's color tier. Future days are always neutral.
    pub status: DayStatus,
    /// Whether the day is in the future and therefore not selectable.
    pub disabled: bool,
}

/// The calendar grid for one month.
#[derive(Debug, Serialize)]
pub struct MonthViewResponse {
    /// The displayed year.
    pub year: i32,
    /// The displayed month, 1-12.
    pub month: u8,
    /// One entry per day of the month, in order.
    pub days: Vec<CalendarDayView>,
    /// The month's spending measured against its budget.
    pub summary: MonthSummary,
    /// The selected day, if one is selected and still belongs to this
    /// month.
    pub selected_day: Option<u8>,
}

/// The detail panel for a selected day.
#[derive(Debug, Serialize)]
pub struct DayDetailResponse {
    /// The selected day of the month.
    pub day: u8,
    /// The day's total spend.
    pub total: i64,
    /// The day's color tier.
    pub status: DayStatus,
    /// The day's spend events, newest first.
    pub items: Vec<SpendItem>,
}

/// The request body for selecting a day.
#[derive(Debug, Deserialize)]
pub struct SelectDayForm {
    /// The day of the displayed month to select.
    pub day: u8,
}

/// Which way to step the displayed month.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDirection {
    /// Show the previous month.
    Back,
    /// Show the next month.
    Forward,
}

/// The request body for stepping the displayed month.
#[derive(Debug, Deserialize)]
pub struct StepForm {
    /// Which way to step.
    pub direction: StepDirection,
}

/// The statistics view: the month against its budget, the category
/// breakdown, and the recent-days trend.
#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    /// The displayed year.
    pub year: i32,
    /// The displayed month, 1-12.
    pub month: u8,
    /// The month's spending measured against its budget.
    pub summary: MonthSummary,
    /// Category totals for the month, largest first.
    pub categories: Vec<CategoryTotal>,
    /// The day-over-day trend for the most recent days, oldest first.
    pub trend: Vec<TrendBar>,
}

fn build_month_view(
    year: i32,
    month: Month,
    selected_day: Option<u8>,
    offset: UtcOffset,
    connection: &Connection,
) -> Result<MonthViewResponse, Error> {
    let items = list_items_for_month(year, month, offset, connection)?;
    let buckets = spent_by_day(&items, year, month, offset);
    let monthly_budget = monthly_variable_budget(connection)?;
    let days_in_month = time::util::days_in_year_month(year, month);
    let daily_budget = monthly_budget / days_in_month as i64;
    let today = today(offset);

    let cursor_for_future_check = CalendarCursor {
        year,
        month,
        selected_day: None,
    };

    let days = (1..=days_in_month)
        .map(|day| {
            let (total, item_count) = buckets
                .get(&day)
                .map(|bucket| (bucket.total, bucket.items.len()))
                .unwrap_or((0, 0));
            let disabled = cursor_for_future_check.is_future_day(day, today);

            CalendarDayView {
                day,
                total,
                item_count,
                // Future days carry no status; they render neutral.
                status: if disabled {
                    DayStatus::None
                } else {
                    day_status(total, daily_budget)
                },
                disabled,
            }
        })
        .collect();

    Ok(MonthViewResponse {
        year,
        month: u8::from(month),
        days,
        summary: month_summary(&items, monthly_budget),
        selected_day,
    })
}

/// A route handler for the calendar grid of one month.
pub async fn month_view_endpoint(
    State(state): State<CalendarState>,
    Path((year, month)): Path<(i32, u8)>,
) -> Result<Json<MonthViewResponse>, Error> {
    let month = month_from_number(month)?;
    let offset = local_offset_or_utc(&state.local_timezone);

    let cursor = *state.cursor.lock().unwrap();
    // The selection only applies to the month it was made in.
    let selected_day = (cursor.year == year && cursor.month == month)
        .then_some(cursor.selected_day)
        .flatten();

    let connection = lock_database(&state.db_connection)?;
    let view = build_month_view(year, month, selected_day, offset, &connection)?;

    Ok(Json(view))
}

/// A route handler that selects a day of the displayed month and returns
/// its detail.
///
/// Days after today are rejected; they render disabled in the grid.
pub async fn select_day_endpoint(
    State(state): State<CalendarState>,
    Json(form): Json<SelectDayForm>,
) -> Result<Json<DayDetailResponse>, Error> {
    let offset = local_offset_or_utc(&state.local_timezone);

    let mut cursor = state.cursor.lock().unwrap();
    cursor.select_day(form.day, today(offset))?;
    let (year, month) = (cursor.year, cursor.month);
    drop(cursor);

    let connection = lock_database(&state.db_connection)?;
    let items = list_items_for_month(year, month, offset, &connection)?;
    let buckets = spent_by_day(&items, year, month, offset);
    let monthly_budget = monthly_variable_budget(&connection)?;
    let daily_budget = monthly_budget / time::util::days_in_year_month(year, month) as i64;

    let (total, day_items) = buckets
        .get(&form.day)
        .map(|bucket| (bucket.total, bucket.items.clone()))
        .unwrap_or((0, Vec::new()));

    Ok(Json(DayDetailResponse {
        day: form.day,
        total,
        status: day_status(total, daily_budget),
        items: day_items,
    }))
}

/// A route handler that steps the displayed month and returns the new
/// grid.
///
/// Stepping always clears the selected day: the detail panel must never
/// show a day from a month that is no longer displayed.
pub async fn step_month_endpoint(
    State(state): State<CalendarState>,
    Json(form): Json<StepForm>,
) -> Result<Json<MonthViewResponse>, Error> {
    let offset = local_offset_or_utc(&state.local_timezone);

    let mut cursor = state.cursor.lock().unwrap();
    match form.direction {
        StepDirection::Back => cursor.step_back(),
        StepDirection::Forward => cursor.step_forward(),
    }
    let (year, month) = (cursor.year, cursor.month);
    drop(cursor);

    let connection = lock_database(&state.db_connection)?;
    let view = build_month_view(year, month, None, offset, &connection)?;

    Ok(Json(view))
}

/// A route handler for the statistics view of the displayed month.
pub async fn statistics_endpoint(
    State(state): State<CalendarState>,
) -> Result<Json<StatisticsResponse>, Error> {
    let offset = local_offset_or_utc(&state.local_timezone);
    let cursor = *state.cursor.lock().unwrap();

    let connection = lock_database(&state.db_connection)?;
    let month_items = list_items_for_month(cursor.year, cursor.month, offset, &connection)?;
    let monthly_budget = monthly_variable_budget(&connection)?;

    // The trend always covers the most recent days, regardless of which
    // month is displayed.
    let all_items = list_all_items(&connection)?;
    let trend = daily_trend(&all_items, today(offset), TREND_DAYS, monthly_budget, offset);

    Ok(Json(StatisticsResponse {
        year: cursor.year,
        month: u8::from(cursor.month),
        summary: month_summary(&month_items, monthly_budget),
        categories: category_totals(&month_items),
        trend,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::Path, extract::State};
    use rusqlite::Connection;
    use time::macros::datetime;

    use super::*;
    use crate::{
        db::initialize,
        ledger::{Category, SpendKind, create_spend_item},
        preferences::{Preferences, save_preferences},
    };

    fn get_test_state(year: i32, month: u8) -> CalendarState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        CalendarState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Asia/Seoul".to_owned(),
            cursor: Arc::new(Mutex::new(CalendarCursor::new(year, month).unwrap())),
        }
    }

    fn seed_june_ledger(state: &CalendarState) {
        let connection = state.db_connection.lock().unwrap();
        save_preferences(
            &Preferences {
                monthly_budget: 1_500_000,
                ..Preferences::default()
            },
            &connection,
        )
        .unwrap();
        create_spend_item(
            SpendItem::build(30_000, SpendKind::Spent, Category::Food)
                .timestamp(datetime!(2020-06-01 12:00 +9)),
            &connection,
        )
        .unwrap();
        create_spend_item(
            SpendItem::build(120_000, SpendKind::Spent, Category::Shopping)
                .timestamp(datetime!(2020-06-10 12:00 +9)),
            &connection,
        )
        .unwrap();
        // Saved money must not show up as spending.
        create_spend_item(
            SpendItem::build(500_000, SpendKind::Saved, Category::Savings)
                .timestamp(datetime!(2020-06-05 12:00 +9)),
            &connection,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn month_view_buckets_and_totals() {
        let state = get_test_state(2020, 6);
        seed_june_ledger(&state);

        let Json(view) = month_view_endpoint(State(state), Path((2020, 6)))
            .await
            .expect("expected the month view to build");

        assert_eq!(view.days.len(), 30);
        assert_eq!(view.days[0].total, 30_000);
        assert_eq!(view.days[0].item_count, 1);
        assert_eq!(view.days[4].total, 0, "saved money is not spending");
        assert_eq!(view.summary.total_spent, 150_000);
        assert_eq!(view.summary.remaining_budget, 1_350_000);
        assert_eq!(view.summary.progress_pct, 10);
    }

    #[tokio::test]
    async fn month_view_rejects_invalid_month() {
        let state = get_test_state(2020, 6);

        let result = month_view_endpoint(State(state), Path((2020, 13))).await;

        assert_eq!(result.unwrap_err(), Error::InvalidMonth(13));
    }

    #[tokio::test]
    async fn future_month_days_are_disabled_and_neutral() {
        // Year 3000 is safely in the future.
        let state = get_test_state(3000, 1);

        let Json(view) = month_view_endpoint(State(state), Path((3000, 1)))
            .await
            .unwrap();

        assert!(view.days.iter().all(|day| day.disabled));
        assert!(view.days.iter().all(|day| day.status == DayStatus::None));
    }

    #[tokio::test]
    async fn selecting_a_past_day_returns_its_items() {
        let state = get_test_state(2020, 6);
        seed_june_ledger(&state);

        let Json(detail) = select_day_endpoint(
            State(state.clone()),
            Json(SelectDayForm { day: 10 }),
        )
        .await
        .expect("expected the selection to succeed");

        assert_eq!(detail.day, 10);
        assert_eq!(detail.total, 120_000);
        assert_eq!(detail.items.len(), 1);
        assert_eq!(state.cursor.lock().unwrap().selected_day, Some(10));
    }

    #[tokio::test]
    async fn selecting_a_future_day_is_rejected() {
        let state = get_test_state(3000, 1);

        let result =
            select_day_endpoint(State(state), Json(SelectDayForm { day: 1 })).await;

        assert_eq!(result.unwrap_err(), Error::FutureDaySelection(1));
    }

    #[tokio::test]
    async fn stepping_clears_the_selection() {
        let state = get_test_state(2020, 6);
        seed_june_ledger(&state);
        select_day_endpoint(State(state.clone()), Json(SelectDayForm { day: 10 }))
            .await
            .unwrap();

        let Json(view) = step_month_endpoint(
            State(state.clone()),
            Json(StepForm {
                direction: StepDirection::Forward,
            }),
        )
        .await
        .unwrap();

        assert_eq!(view.month, 7);
        assert_eq!(view.selected_day, None);
        assert_eq!(state.cursor.lock().unwrap().selected_day, None);
    }

    #[tokio::test]
    async fn statistics_break_down_categories() {
        let state = get_test_state(2020, 6);
        seed_june_ledger(&state);

        let Json(stats) = statistics_endpoint(State(state)).await.unwrap();

        assert_eq!(stats.summary.total_spent, 150_000);
        assert_eq!(stats.categories.len(), 2);
        assert_eq!(stats.categories[0].category, Category::Shopping);
        assert_eq!(stats.categories[0].percentage, 80.0);
        assert_eq!(stats.trend.len(), TREND_DAYS as usize);
        // The trend covers recent days; the 2020 ledger does not reach it.
        assert!(stats.trend.iter().all(|bar| bar.total == 0));
    }

    #[tokio::test]
    async fn empty_month_statistics_are_zero() {
        let state = get_test_state(2020, 2);

        let Json(stats) = statistics_endpoint(State(state)).await.unwrap();

        assert_eq!(stats.summary.total_spent, 0);
        assert_eq!(stats.summary.progress_pct, 0);
        assert!(stats.categories.is_empty());
    }
}
