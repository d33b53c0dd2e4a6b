//! Defines the endpoint for deleting a ledger item.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error, app_state::lock_database, database_id::SpendItemId,
    ledger::delete_spend_item,
};

/// The state needed to delete a ledger item.
#[derive(Clone)]
pub struct DeleteSpendItemState {
    /// The database connection for the ledger.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteSpendItemState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a ledger item by its ID.
pub async fn delete_spend_item_endpoint(
    State(state): State<DeleteSpendItemState>,
    Path(item_id): Path<SpendItemId>,
) -> Result<StatusCode, Error> {
    let connection = lock_database(&state.db_connection)?;
    delete_spend_item(item_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
