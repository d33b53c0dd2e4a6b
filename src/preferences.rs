//! User preferences: payday, monthly variable budget, onboarding state.
//!
//! Preferences are stored as one JSON value in a key/value table, read on
//! demand and rewritten in full on every change. A malformed stored value
//! is treated as "no prior data": the mount path must never fail because
//! of a bad write in the past.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, allocation::latest_adjusted_budget, app_state::lock_database};

const PREFERENCES_KEY: &str = "user_preferences";

/// The user's stored settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// The day of the month the user is paid.
    pub payday: u8,
    /// The monthly variable spending budget in won. Zero means "not set",
    /// in which case the confirmed living expense allocation is used.
    pub monthly_budget: i64,
    /// Whether the user has finished the onboarding flow.
    pub onboarding_complete: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            payday: 1,
            monthly_budget: 0,
            onboarding_complete: false,
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Load the stored preferences, or the defaults when nothing valid is
/// stored.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
/// A malformed stored value is not an error; it is logged and replaced by
/// the defaults.
pub fn load_preferences(connection: &Connection) -> Result<Preferences, Error> {
    let stored: Option<String> = connection
        .query_row(
            "SELECT value FROM preference WHERE key = ?1",
            params![PREFERENCES_KEY],
            |row| row.get(0),
        )
        .optional()?;

    let Some(stored) = stored else {
        return Ok(Preferences::default());
    };

    match serde_json::from_str(&stored) {
        Ok(preferences) => Ok(preferences),
        Err(error) => {
            tracing::warn!("stored preferences are malformed ({error}), using defaults");
            Ok(Preferences::default())
        }
    }
}

/// Replace the stored preferences.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn save_preferences(
    preferences: &Preferences,
    connection: &Connection,
) -> Result<(), Error> {
    // Serializing a plain struct of integers and bools cannot fail.
    let value = serde_json::to_string(preferences).expect("preferences serialize to JSON");

    connection.execute(
        "INSERT INTO preference (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![PREFERENCES_KEY, value],
    )?;

    Ok(())
}

/// The monthly variable budget the calendar measures spending against.
///
/// Uses the preference when set, otherwise the living expense amount of
/// the most recently confirmed budget, otherwise zero.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn monthly_variable_budget(connection: &Connection) -> Result<i64, Error> {
    let preferences = load_preferences(connection)?;
    if preferences.monthly_budget > 0 {
        return Ok(preferences.monthly_budget);
    }

    match latest_adjusted_budget(connection) {
        Ok(budget) => Ok(budget.living_expense),
        Err(Error::NotFound) => Ok(0),
        Err(error) => Err(error),
    }
}

/// Create the preference table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL
/// error.
pub fn create_preference_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS preference (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// The state needed by the preference handlers.
#[derive(Clone)]
pub struct PreferencesState {
    /// The database connection for preferences.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for PreferencesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that returns the stored preferences.
pub async fn get_preferences_endpoint(
    State(state): State<PreferencesState>,
) -> Result<Json<Preferences>, Error> {
    let connection = lock_database(&state.db_connection)?;
    let preferences = load_preferences(&connection)?;

    Ok(Json(preferences))
}

/// A route handler that replaces the stored preferences.
pub async fn put_preferences_endpoint(
    State(state): State<PreferencesState>,
    Json(preferences): Json<Preferences>,
) -> Result<Json<Preferences>, Error> {
    let connection = lock_database(&state.db_connection)?;
    save_preferences(&preferences, &connection)?;

    Ok(Json(preferences))
}

// ============================================================================
// TESTS
// ============================================================================
