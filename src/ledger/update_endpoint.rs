//! Defines the endpoint for editing a ledger item in place.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    app_state::lock_database,
    database_id::SpendItemId,
    ledger::{SpendItem, SpendItemUpdate, update_spend_item},
};

/// The state needed to update a ledger item.
#[derive(Clone)]
pub struct UpdateSpendItemState {
    /// The database connection for the ledger.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateSpendItemState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for applying a partial update to a ledger item.
///
/// The item's identity and creation time cannot be changed through this
/// endpoint; the update body has no way to express them.
pub async fn update_spend_item_endpoint(
    State(state): State<UpdateSpendItemState>,
    Path(item_id): Path<SpendItemId>,
    Json(update): Json<SpendItemUpdate>,
) -> Result<Json<SpendItem>, Error> {
    let connection = lock_database(&state.db_connection)?;
    let item = update_spend_item(item_id, update, &connection)?;

    Ok(Json(item))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::Path, extract::State};
    use rusqlite::Connection;

    use super::{UpdateSpendItemState, update_spend_item_endpoint};
    use crate::{
        Error,
        db::initialize,
        ledger::{Category, SpendItem, SpendItemUpdate, SpendKind, create_spend_item},
    };

    fn get_test_state() -> UpdateSpendItemState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        UpdateSpendItemState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    #[tokio::test]
    async fn can_update_amount() {
        let state = get_test_state();
        let item = {
            let connection = state.db_connection.lock().unwrap();
            create_spend_item(
                SpendItem::build(10_000, SpendKind::Spent, Category::Food),
                &connection,
            )
            .unwrap()
        };

        let Json(updated) = update_spend_item_endpoint(
            State(state),
            Path(item.id),
            Json(SpendItemUpdate {
                amount: Some(7_500),
                ..Default::default()
            }),
        )
        .await
        .expect("expected the update to succeed");

        assert_eq!(updated.amount, 7_500);
        assert_eq!(updated.id, item.id);
        assert_eq!(updated.created_at, item.created_at);
    }

    #[tokio::test]
    async fn updating_missing_item_is_not_found() {
        let state = get_test_state();

        let result = update_spend_item_endpoint(
            State(state),
            Path(404),
            Json(SpendItemUpdate::default()),
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::NotFound);
    }
}
