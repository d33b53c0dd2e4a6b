//! Defines the endpoint for recording a new ledger item.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    app_state::lock_database,
    ledger::{Category, Emotion, InputMethod, SpendItem, SpendKind, create_spend_item},
};

/// The state needed to record a ledger item.
#[derive(Clone)]
pub struct CreateSpendItemState {
    /// The database connection for the ledger.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateSpendItemState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for recording a ledger item.
#[derive(Debug, Deserialize)]
pub struct SpendItemForm {
    /// The amount in whole won.
    pub amount: i64,
    /// Whether the money was spent, saved, or invested.
    pub kind: SpendKind,
    /// The spending category.
    pub category: Category,
    /// The motivation behind a spend.
    #[serde(default)]
    pub emotion: Option<Emotion>,
    /// A free-text description.
    #[serde(default)]
    pub memo: String,
    /// A free-text annotation.
    #[serde(default)]
    pub tag: Option<String>,
    /// How the item was entered. Defaults to manual entry.
    #[serde(default)]
    pub input_method: InputMethod,
    /// The event time. Defaults to now.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

/// A route handler for recording a new ledger item.
pub async fn create_spend_item_endpoint(
    State(state): State<CreateSpendItemState>,
    Json(form): Json<SpendItemForm>,
) -> Result<(StatusCode, Json<SpendItem>), Error> {
    let mut builder = SpendItem::build(form.amount, form.kind, form.category)
        .emotion(form.emotion)
        .memo(&form.memo)
        .tag(form.tag)
        .input_method(form.input_method);

    if let Some(timestamp) = form.timestamp {
        builder = builder.timestamp(timestamp);
    }

    let connection = lock_database(&state.db_connection)?;
    let item = create_spend_item(builder, &connection)?;

    Ok((StatusCode::CREATED, Json(item)))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use super::{CreateSpendItemState, SpendItemForm, create_spend_item_endpoint};
    use crate::{
        Error,
        db::initialize,
        ledger::{Category, InputMethod, SpendKind, get_spend_item},
    };

    fn get_test_state() -> CreateSpendItemState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        CreateSpendItemState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn minimal_form(amount: i64) -> SpendItemForm {
        SpendItemForm {
            amount,
            kind: SpendKind::Spent,
            category: Category::Food,
            emotion: None,
            memo: String::new(),
            tag: None,
            input_method: InputMethod::default(),
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn can_create_item() {
        let state = get_test_state();

        let (status, Json(item)) =
            create_spend_item_endpoint(State(state.clone()), Json(minimal_form(12_000)))
                .await
                .expect("expected the item to be created");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(item.amount, 12_000);

        // Verify the item was actually stored.
        let connection = state.db_connection.lock().unwrap();
        let got = get_spend_item(item.id, &connection).expect("item missing from database");
        assert_eq!(got, item);
    }

    #[tokio::test]
    async fn negative_amount_is_rejected() {
        let state = get_test_state();

        let result =
            create_spend_item_endpoint(State(state), Json(minimal_form(-100))).await;

        assert_eq!(result.unwrap_err(), Error::NegativeAmount(-100));
    }
}
