//! Assistant HTTP handlers.
//!
//! These wrap the external assistant API for the app: chat replies carry
//! the user's financial context, and every upstream failure is converted
//! into a safe response rather than an error page.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    allocation::latest_adjusted_budget,
    app_state::lock_database,
    assistant::{AssistantClient, ChatContext},
    ledger::daily_summary,
    preferences::monthly_variable_budget,
    timezone::{local_offset_or_utc, today},
};

/// The state needed by the assistant handlers.
#[derive(Clone)]
pub struct AssistantState {
    /// The database connection for building the chat context.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name.
    pub local_timezone: String,
    /// The client for the external assistant API.
    pub assistant: AssistantClient,
}

impl FromRef<AppState> for AssistantState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            assistant: state.assistant.clone(),
        }
    }
}

/// The request body for a chat message.
#[derive(Debug, Deserialize)]
pub struct ChatForm {
    /// What the user said.
    pub message: String,
}

/// The assistant's reply.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// The reply text, or the fallback when the service is unreachable.
    pub reply: String,
}

/// The request body for speech synthesis.
#[derive(Debug, Deserialize)]
pub struct TtsForm {
    /// The text to speak.
    pub text: String,
}

/// Synthesized speech.
#[derive(Debug, Serialize)]
pub struct TtsResponse {
    /// Base64-encoded PCM audio.
    pub audio: String,
}

/// Whether the assistant is ready.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// True once the warm-up probe succeeds.
    pub healthy: bool,
}

/// Gather the user's numbers for the assistant's context.
///
/// Each piece is optional; a fresh install simply sends an empty context.
fn build_chat_context(
    connection: &Connection,
    local_timezone: &str,
) -> Result<ChatContext, Error> {
    let monthly_income = match latest_adjusted_budget(connection) {
        Ok(budget) => Some(budget.total_income),
        Err(Error::NotFound) => None,
        Err(error) => return Err(error),
    };

    let monthly_budget = match monthly_variable_budget(connection)? {
        0 => None,
        budget => Some(budget),
    };

    let offset = local_offset_or_utc(local_timezone);
    let today_spent = Some(daily_summary(today(offset), offset, connection)?.spent);

    Ok(ChatContext {
        monthly_income,
        monthly_budget,
        today_spent,
    })
}

/// A route handler that relays a chat message to the assistant.
///
/// Upstream failures surface as the fallback reply with a 200 status; the
/// chat screen always has something to show.
pub async fn chat_endpoint(
    State(state): State<AssistantState>,
    Json(form): Json<ChatForm>,
) -> Result<Json<ChatResponse>, Error> {
    let context = {
        let connection = lock_database(&state.db_connection)?;
        build_chat_context(&connection, &state.local_timezone)?
    };

    let reply = state.assistant.chat(&form.message, &context).await;

    Ok(Json(ChatResponse { reply }))
}

/// A route handler that synthesizes speech for a reply.
pub async fn tts_endpoint(
    State(state): State<AssistantState>,
    Json(form): Json<TtsForm>,
) -> Result<Json<TtsResponse>, Error> {
    let audio = state.assistant.tts(&form.text).await?;

    Ok(Json(TtsResponse { audio }))
}

/// A route handler that probes the assistant's health, retrying while it
/// warms up.
pub async fn health_endpoint(State(state): State<AssistantState>) -> Json<HealthResponse> {
    let healthy = state.assistant.warm_up().await;

    Json(HealthResponse { healthy })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State};
    use rusqlite::Connection;

    use super::*;
    use crate::{
        allocation::{NewAdjustedBudget, store_adjusted_budget},
        assistant::CHAT_FALLBACK_REPLY,
        db::initialize,
    };

    fn get_test_state() -> AssistantState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        AssistantState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Asia/Seoul".to_owned(),
            // Port 9 (discard) refuses connections immediately.
            assistant: AssistantClient::new("http://127.0.0.1:9"),
        }
    }

    #[tokio::test]
    async fn chat_degrades_to_the_fallback_reply() {
        let state = get_test_state();

        let Json(got) = chat_endpoint(
            State(state),
            Json(ChatForm {
                message: "how am I doing this month?".to_owned(),
            }),
        )
        .await
        .expect("chat must not fail even when the service is down");

        assert_eq!(got.reply, CHAT_FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn tts_surfaces_unavailability() {
        let state = get_test_state();

        let result = tts_endpoint(
            State(state),
            Json(TtsForm {
                text: "hello".to_owned(),
            }),
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::AssistantUnavailable);
    }

    #[test]
    fn context_reflects_the_confirmed_budget() {
        let state = get_test_state();
        let connection = state.db_connection.lock().unwrap();
        store_adjusted_budget(
            &NewAdjustedBudget {
                living_expense: 1_500_000,
                savings: 2_000_000,
                pension: 500_000,
                insurance: 500_000,
                loan_payment: 500_000,
                total_income: 5_000_000,
            },
            &connection,
        )
        .unwrap();

        let got = build_chat_context(&connection, "Asia/Seoul").unwrap();

        assert_eq!(got.monthly_income, Some(5_000_000));
        assert_eq!(got.monthly_budget, Some(1_500_000));
        assert_eq!(got.today_spent, Some(0));
    }

    #[test]
    fn context_is_empty_on_a_fresh_install() {
        let state = get_test_state();
        let connection = state.db_connection.lock().unwrap();

        let got = build_chat_context(&connection, "Asia/Seoul").unwrap();

        assert_eq!(got.monthly_income, None);
        assert_eq!(got.monthly_budget, None);
        assert_eq!(got.today_spent, Some(0));
    }
}
