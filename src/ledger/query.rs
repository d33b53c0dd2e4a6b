//! Day and month queries over the ledger.
//!
//! All filtering compares the event `timestamp` (not `created_at`)
//! normalized to the service's local day or month. Sums are recomputed on
//! every read; ledgers are single-user and hand-entered, so there is
//! nothing worth caching.

use rusqlite::Connection;
use serde::Serialize;
use time::{Date, Month, UtcOffset};

use crate::{
    Error,
    ledger::{SpendItem, SpendKind, core::map_spend_item_row},
    timezone::local_date,
};

/// The spend/save/invest sums for one local day.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    /// Total spent on the day.
    pub spent: i64,
    /// Total put aside on the day.
    pub saved: i64,
    /// Total invested on the day.
    pub invested: i64,
}

/// List every ledger item, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_all_items(connection: &Connection) -> Result<Vec<SpendItem>, Error> {
    let mut statement = connection.prepare(
        "SELECT id, amount, kind, category, emotion, memo, tag, input_method,
            timestamp, created_at
         FROM spend_item
         ORDER BY timestamp DESC, id DESC",
    )?;

    let items = statement
        .query_map([], map_spend_item_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(items)
}

/// List the ledger items whose event time falls on the given local day,
/// newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_items_for_day(
    date: Date,
    offset: UtcOffset,
    connection: &Connection,
) -> Result<Vec<SpendItem>, Error> {
    let items = list_all_items(connection)?
        .into_iter()
        .filter(|item| local_date(item.timestamp, offset) == date)
        .collect();

    Ok(items)
}

/// List the ledger items whose event time falls in the given local month,
/// newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_items_for_month(
    year: i32,
    month: Month,
    offset: UtcOffset,
    connection: &Connection,
) -> Result<Vec<SpendItem>, Error> {
    let items = list_all_items(connection)?
        .into_iter()
        .filter(|item| {
            let date = local_date(item.timestamp, offset);
            date.year() == year && date.month() == month
        })
        .collect();

    Ok(items)
}

/// Sum the day's items by kind.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn daily_summary(
    date: Date,
    offset: UtcOffset,
    connection: &Connection,
) -> Result<DailySummary, Error> {
    let mut summary = DailySummary::default();

    for item in list_items_for_day(date, offset, connection)? {
        match item.kind {
            SpendKind::Spent => summary.spent += item.amount,
            SpendKind::Saved => summary.saved += item.amount,
            SpendKind::Investment => summary.invested += item.amount,
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::{date, datetime, offset};

    use super::*;
    use crate::{
        db::initialize,
        ledger::{Category, SpendItem, create_spend_item},
    };

    const SEOUL: UtcOffset = offset!(+9);

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn day_query_finds_added_item() {
        let conn = get_test_connection();
        let item = create_spend_item(
            SpendItem::build(8_000, SpendKind::Spent, Category::Food)
                .timestamp(datetime!(2025-06-13 12:30 +9)),
            &conn,
        )
        .unwrap();

        let got = list_items_for_day(date!(2025 - 06 - 13), SEOUL, &conn).unwrap();

        assert_eq!(got, vec![item]);
    }

    #[test]
    fn day_query_compares_event_time_not_creation_time() {
        let conn = get_test_connection();
        // Created now, but the event happened on an earlier day.
        create_spend_item(
            SpendItem::build(8_000, SpendKind::Spent, Category::Food)
                .timestamp(datetime!(2025-06-01 09:00 +9)),
            &conn,
        )
        .unwrap();

        let on_event_day = list_items_for_day(date!(2025 - 06 - 01), SEOUL, &conn).unwrap();

        assert_eq!(on_event_day.len(), 1);
    }

    #[test]
    fn day_boundary_respects_local_offset() {
        let conn = get_test_connection();
        // 23:30 UTC on the 12th is 08:30 on the 13th in Seoul.
        create_spend_item(
            SpendItem::build(3_000, SpendKind::Spent, Category::Cafe)
                .timestamp(datetime!(2025-06-12 23:30 UTC)),
            &conn,
        )
        .unwrap();

        assert!(list_items_for_day(date!(2025 - 06 - 12), SEOUL, &conn)
            .unwrap()
            .is_empty());
        assert_eq!(
            list_items_for_day(date!(2025 - 06 - 13), SEOUL, &conn)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn month_query_excludes_neighboring_months() {
        let conn = get_test_connection();
        create_spend_item(
            SpendItem::build(1_000, SpendKind::Spent, Category::Food)
                .timestamp(datetime!(2025-05-31 12:00 +9)),
            &conn,
        )
        .unwrap();
        create_spend_item(
            SpendItem::build(2_000, SpendKind::Spent, Category::Food)
                .timestamp(datetime!(2025-06-15 12:00 +9)),
            &conn,
        )
        .unwrap();
        create_spend_item(
            SpendItem::build(3_000, SpendKind::Spent, Category::Food)
                .timestamp(datetime!(2025-07-01 12:00 +9)),
            &conn,
        )
        .unwrap();

        let got = list_items_for_month(2025, Month::June, SEOUL, &conn).unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].amount, 2_000);
    }

    #[test]
    fn listings_are_newest_first() {
        let conn = get_test_connection();
        create_spend_item(
            SpendItem::build(1_000, SpendKind::Spent, Category::Food)
                .timestamp(datetime!(2025-06-13 09:00 +9)),
            &conn,
        )
        .unwrap();
        create_spend_item(
            SpendItem::build(2_000, SpendKind::Spent, Category::Food)
                .timestamp(datetime!(2025-06-13 18:00 +9)),
            &conn,
        )
        .unwrap();

        let got = list_items_for_day(date!(2025 - 06 - 13), SEOUL, &conn).unwrap();

        assert_eq!(got[0].amount, 2_000);
        assert_eq!(got[1].amount, 1_000);
    }

    #[test]
    fn summary_sums_by_kind() {
        let conn = get_test_connection();
        let day = datetime!(2025-06-13 12:00 +9);
        for (amount, kind, category) in [
            (10_000, SpendKind::Spent, Category::Food),
            (5_000, SpendKind::Spent, Category::Cafe),
            (50_000, SpendKind::Saved, Category::Savings),
            (30_000, SpendKind::Investment, Category::Other),
        ] {
            create_spend_item(
                SpendItem::build(amount, kind, category).timestamp(day),
                &conn,
            )
            .unwrap();
        }

        let got = daily_summary(date!(2025 - 06 - 13), SEOUL, &conn).unwrap();

        assert_eq!(
            got,
            DailySummary {
                spent: 15_000,
                saved: 50_000,
                invested: 30_000,
            }
        );
    }

    #[test]
    fn summary_of_empty_day_is_zero() {
        let conn = get_test_connection();

        let got = daily_summary(date!(2025 - 06 - 13), SEOUL, &conn).unwrap();

        assert_eq!(got, DailySummary::default());
    }
}
