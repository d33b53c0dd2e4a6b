//! Defines the endpoint for today's spend/save/invest sums.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    app_state::lock_database,
    ledger::{DailySummary, daily_summary},
    timezone::{local_offset_or_utc, today},
};

/// The state needed to compute today's summary.
#[derive(Clone)]
pub struct TodaySummaryState {
    /// The database connection for the ledger.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name.
    pub local_timezone: String,
}

impl FromRef<AppState> for TodaySummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Today's date alongside its spend/save/invest sums.
#[derive(Debug, Serialize)]
pub struct TodaySummary {
    /// The local date the sums cover, as YYYY-MM-DD.
    pub date: String,
    /// The sums for the day, recomputed on every request.
    #[serde(flatten)]
    pub summary: DailySummary,
}

/// A route handler for today's spend/save/invest sums.
///
/// "Today" is resolved against the service's configured timezone, so a
/// late-evening entry lands on the correct local day.
pub async fn today_summary_endpoint(
    State(state): State<TodaySummaryState>,
) -> Result<Json<TodaySummary>, Error> {
    let offset = local_offset_or_utc(&state.local_timezone);
    let date = today(offset);

    let connection = lock_database(&state.db_connection)?;
    let summary = daily_summary(date, offset, &connection)?;

    Ok(Json(TodaySummary {
        date: date.to_string(),
        summary,
    }))
}
