//! Moneya is a self-hosted web service for managing a personal spending
//! ledger and monthly budget.
//!
//! This library provides a JSON REST API covering the spend ledger, the
//! five-way budget allocator, spend diagnostics, the calendar and statistics
//! views, the wealth diagnostic, and a thin client for the external
//! assistant API.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod allocation;
mod app_state;
mod assistant;
mod calendar;
mod course;
mod database_id;
mod db;
mod diagnostics;
mod endpoints;
mod ledger;
mod preferences;
mod routing;
mod timezone;
mod wealth;

pub use allocation::{
    AdjustedBudget, AllocationField, AllocationSession, RecommendedAllocation, recommend,
};
pub use app_state::AppState;
pub use assistant::{
    AssistantClient, AudioSink, ClientFrame, PlaybackQueue, ServerFrame, VoiceSession,
    VoiceSessionState,
};
pub use calendar::{CalendarCursor, DayStatus};
pub use db::initialize as initialize_db;
pub use diagnostics::{Diagnosis, DiagnosisStatus, diagnose};
pub use ledger::{Category, Emotion, InputMethod, SpendItem, SpendKind};
pub use routing::build_router;
pub use wealth::{WealthTier, compute_wealth_index, tier_for_index};

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down
/// gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A negative amount was used to create or update a ledger item.
    ///
    /// Ledger amounts record magnitudes; whether money left or entered the
    /// household is carried by the item's kind, so amounts below zero are
    /// always a caller mistake.
    #[error("{0} is a negative amount, which is not allowed")]
    NegativeAmount(i64),

    /// A zero or negative income was used to start a budget allocation.
    #[error("cannot allocate a budget for an income of {0}")]
    NonPositiveIncome(i64),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the
    /// parameters (e.g., ID) are correct and that the resource has been
    /// created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A month number outside 1-12 was given.
    #[error("invalid month: {0}. Must be between 1 and 12")]
    InvalidMonth(u8),

    /// A day number was given that does not exist in the displayed month.
    #[error("day {0} does not exist in the displayed month")]
    DayOutOfRange(u8),

    /// A day in the future was selected on the calendar.
    ///
    /// Future days of the current month are rendered disabled and carry no
    /// spending status, so selecting one is rejected.
    #[error("day {0} is in the future and cannot be selected")]
    FutureDaySelection(u8),

    /// An allocation operation was attempted with no active session.
    #[error("no budget allocation session has been started")]
    NoAllocationSession,

    /// A drag was attempted on a field that the user has confirmed.
    #[error("the {0} field is confirmed and cannot be adjusted until unlocked")]
    FieldLocked(AllocationField),

    /// The allocated amounts exceed the income.
    ///
    /// Confirmation is blocked until the user adjusts the fields so the
    /// surplus is zero or positive.
    #[error("the allocation exceeds the income by {0}")]
    NegativeSurplus(i64),

    /// Confirmation was attempted while one or more fields are unconfirmed.
    #[error("all five allocation fields must be confirmed before finalizing")]
    UnconfirmedFields,

    /// A wealth diagnostic input that must be positive was zero or negative.
    ///
    /// The wealth index divides by age and income, so both must be
    /// validated before computing rather than coercing a division by zero.
    #[error("{0} must be greater than zero")]
    NonPositiveWealthInput(&'static str),

    /// The external assistant API could not be reached.
    #[error("the assistant service is unavailable")]
    AssistantUnavailable,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body returned for every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// A human-readable description of what went wrong.
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::NotFound | Error::NoAllocationSession => StatusCode::NOT_FOUND,
            Error::NegativeAmount(_)
            | Error::NonPositiveIncome(_)
            | Error::InvalidMonth(_)
            | Error::DayOutOfRange(_)
            | Error::FutureDaySelection(_)
            | Error::NegativeSurplus(_)
            | Error::UnconfirmedFields
            | Error::NonPositiveWealthInput(_) => StatusCode::BAD_REQUEST,
            Error::FieldLocked(_) => StatusCode::CONFLICT,
            Error::AssistantUnavailable => StatusCode::BAD_GATEWAY,
            Error::SqlError(_) | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal details belong in the server logs, not the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "Something went wrong, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
