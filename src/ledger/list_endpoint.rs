//! Defines the endpoint for listing ledger items.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    app_state::lock_database,
    database_id::SpendItemId,
    ledger::{
        SpendItem, get_spend_item, list_all_items, list_items_for_day, list_items_for_month,
    },
    timezone::{local_offset_or_utc, month_from_number},
};

/// The state needed to list ledger items.
#[derive(Clone)]
pub struct ListSpendItemsState {
    /// The database connection for the ledger.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name.
    pub local_timezone: String,
}

impl FromRef<AppState> for ListSpendItemsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Query parameters selecting which slice of the ledger to list.
///
/// With `year`, `month`, and `day` the listing covers one local day; with
/// `year` and `month` one local month; with nothing, the whole ledger.
#[derive(Debug, Default, Deserialize)]
pub struct LedgerQuery {
    /// The calendar year.
    pub year: Option<i32>,
    /// The calendar month, 1-12.
    pub month: Option<u8>,
    /// The day of the month.
    pub day: Option<u8>,
}

/// A route handler for fetching one ledger item by its ID.
pub async fn get_spend_item_endpoint(
    State(state): State<ListSpendItemsState>,
    Path(item_id): Path<SpendItemId>,
) -> Result<Json<SpendItem>, Error> {
    let connection = lock_database(&state.db_connection)?;
    let item = get_spend_item(item_id, &connection)?;

    Ok(Json(item))
}

/// A route handler for listing ledger items, newest first.
pub async fn list_spend_items_endpoint(
    State(state): State<ListSpendItemsState>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<Vec<SpendItem>>, Error> {
    let offset = local_offset_or_utc(&state.local_timezone);
    let connection = lock_database(&state.db_connection)?;

    let items = match (query.year, query.month, query.day) {
        (Some(year), Some(month), Some(day)) => {
            let month = month_from_number(month)?;
            let date = Date::from_calendar_date(year, month, day)
                .map_err(|_| Error::DayOutOfRange(day))?;
            list_items_for_day(date, offset, &connection)?
        }
        (Some(year), Some(month), None) => {
            let month = month_from_number(month)?;
            list_items_for_month(year, month, offset, &connection)?
        }
        _ => list_all_items(&connection)?,
    };

    Ok(Json(items))
}
