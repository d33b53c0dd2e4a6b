//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::{
    Error, allocation::AllocationSession, assistant::AssistantClient,
    calendar::CalendarCursor, db::initialize, timezone,
};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The local timezone as a canonical timezone name, e.g. "Asia/Seoul".
    ///
    /// All day and month bucketing resolves event timestamps against this
    /// timezone.
    pub local_timezone: String,

    /// The in-progress budget allocation session, if any.
    ///
    /// Kept in memory only: an allocation session is a single sitting at
    /// the sliders, and an unconfirmed session is worthless after a
    /// restart.
    pub allocation_session: Arc<Mutex<Option<AllocationSession>>>,

    /// The calendar's displayed month and selected day.
    ///
    /// Kept in memory and not persisted, for the same reason.
    pub calendar_cursor: Arc<Mutex<CalendarCursor>>,

    /// The client for the external assistant API.
    pub assistant: AssistantClient,
}

impl AppState {
    /// Create the app state, initializing the database schema.
    ///
    /// # Errors
    /// Returns an error if the database schema cannot be created.
    pub fn new(
        connection: Connection,
        local_timezone: &str,
        assistant: AssistantClient,
    ) -> Result<Self, Error> {
        initialize(&connection)?;

        let offset = timezone::local_offset_or_utc(local_timezone);
        let cursor = CalendarCursor::for_date(timezone::today(offset));

        Ok(Self {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: local_timezone.to_owned(),
            allocation_session: Arc::new(Mutex::new(None)),
            calendar_cursor: Arc::new(Mutex::new(cursor)),
            assistant,
        })
    }
}

/// Acquire the database lock, mapping a poisoned lock to [Error::DatabaseLockError].
pub(crate) fn lock_database(
    db_connection: &Arc<Mutex<Connection>>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}
