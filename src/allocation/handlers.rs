//! Allocation HTTP handlers.
//!
//! This module contains the route handlers for starting, adjusting, and
//! confirming a budget allocation session, plus the read endpoint for the
//! most recently confirmed budget.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    allocation::{
        AdjustedBudget, AllocationField, AllocationSession, DragOutcome, SessionView,
        latest_adjusted_budget, store_adjusted_budget,
    },
    app_state::lock_database,
};

/// The state needed by the allocation handlers.
///
/// The session itself is in-memory: one sitting at the sliders, owned by
/// the single active user.
#[derive(Clone)]
pub struct AllocationState {
    /// The database connection for confirmed budgets.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The in-progress allocation session, if any.
    pub session: Arc<Mutex<Option<AllocationSession>>>,
}

impl FromRef<AppState> for AllocationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            session: state.allocation_session.clone(),
        }
    }
}

/// The request body for starting an allocation session.
#[derive(Debug, Deserialize)]
pub struct StartAllocationForm {
    /// The monthly income to allocate, in whole won.
    pub income: i64,
    /// The number of people in the household.
    pub family_size: u8,
}

/// The request body for dragging one field.
#[derive(Debug, Deserialize)]
pub struct DragForm {
    /// The field being dragged.
    pub field: AllocationField,
    /// The raw dragged amount.
    pub amount: i64,
}

/// The request body naming one field to lock or unlock.
#[derive(Debug, Deserialize)]
pub struct FieldForm {
    /// The field to act on.
    pub field: AllocationField,
}

/// The response to a drag: the outcome plus the session's new surplus.
#[derive(Debug, Serialize)]
pub struct DragResponse {
    /// What happened to the dragged field.
    #[serde(flatten)]
    pub outcome: DragOutcome,
    /// Income minus the sum of the five fields after the drag.
    pub surplus: i64,
}

/// A route handler that starts a new allocation session.
///
/// Any in-progress session is discarded; the sliders always start from the
/// fresh recommendation.
pub async fn start_allocation_endpoint(
    State(state): State<AllocationState>,
    Json(form): Json<StartAllocationForm>,
) -> Result<Json<SessionView>, Error> {
    let session = AllocationSession::start(form.income, form.family_size)?;
    let view = session.view();

    *state.session.lock().unwrap() = Some(session);

    Ok(Json(view))
}

/// A route handler that drags one allocation field to a new amount.
pub async fn drag_allocation_endpoint(
    State(state): State<AllocationState>,
    Json(form): Json<DragForm>,
) -> Result<Json<DragResponse>, Error> {
    let mut guard = state.session.lock().unwrap();
    let session = guard.as_mut().ok_or(Error::NoAllocationSession)?;

    let outcome = session.drag(form.field, form.amount)?;
    let surplus = session.surplus();

    Ok(Json(DragResponse { outcome, surplus }))
}

/// A route handler that confirms (locks) one allocation field.
pub async fn lock_allocation_endpoint(
    State(state): State<AllocationState>,
    Json(form): Json<FieldForm>,
) -> Result<Json<SessionView>, Error> {
    let mut guard = state.session.lock().unwrap();
    let session = guard.as_mut().ok_or(Error::NoAllocationSession)?;

    session.lock(form.field);

    Ok(Json(session.view()))
}

/// A route handler that unlocks a previously confirmed field.
pub async fn unlock_allocation_endpoint(
    State(state): State<AllocationState>,
    Json(form): Json<FieldForm>,
) -> Result<Json<SessionView>, Error> {
    let mut guard = state.session.lock().unwrap();
    let session = guard.as_mut().ok_or(Error::NoAllocationSession)?;

    session.unlock(form.field);

    Ok(Json(session.view()))
}

/// A route handler that finalizes the session into a stored budget.
///
/// Requires all five fields confirmed and a non-negative surplus. On
/// success the session ends; re-budgeting later starts a fresh one.
pub async fn confirm_allocation_endpoint(
    State(state): State<AllocationState>,
) -> Result<(StatusCode, Json<AdjustedBudget>), Error> {
    let mut guard = state.session.lock().unwrap();
    let session = guard.as_ref().ok_or(Error::NoAllocationSession)?;

    let budget = session.confirm()?;

    let stored = {
        let connection = lock_database(&state.db_connection)?;
        store_adjusted_budget(&budget, &connection)?
    };

    // Only clear the session once the snapshot is safely stored.
    *guard = None;

    Ok((StatusCode::CREATED, Json(stored)))
}

/// A route handler for inspecting the in-progress session.
pub async fn current_allocation_endpoint(
    State(state): State<AllocationState>,
) -> Result<Json<SessionView>, Error> {
    let guard = state.session.lock().unwrap();
    let session = guard.as_ref().ok_or(Error::NoAllocationSession)?;

    Ok(Json(session.view()))
}

/// A route handler for the most recently confirmed budget.
pub async fn latest_budget_endpoint(
    State(state): State<AllocationState>,
) -> Result<Json<AdjustedBudget>, Error> {
    let connection = lock_database(&state.db_connection)?;
    let budget = latest_adjusted_budget(&connection)?;

    Ok(Json(budget))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State};
    use rusqlite::Connection;

    use super::*;
    use crate::db::initialize;

    fn get_test_state() -> AllocationState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        AllocationState {
            db_connection: Arc::new(Mutex::new(conn)),
            session: Arc::new(Mutex::new(None)),
        }
    }

    async fn start_session(state: &AllocationState) -> SessionView {
        let Json(view) = start_allocation_endpoint(
            State(state.clone()),
            Json(StartAllocationForm {
                income: 5_000_000,
                family_size: 2,
            }),
        )
        .await
        .expect("expected the session to start");
        view
    }

    #[tokio::test]
    async fn start_returns_recommended_split() {
        let state = get_test_state();

        let view = start_session(&state).await;

        assert_eq!(view.total_income, 5_000_000);
        assert_eq!(view.surplus, 0);
        let savings = view
            .fields
            .iter()
            .find(|f| f.field == AllocationField::Savings)
            .unwrap();
        assert_eq!(savings.recommended, 2_000_000);
        assert!(!view.can_confirm, "fields start unconfirmed");
    }

    #[tokio::test]
    async fn drag_without_session_is_not_found() {
        let state = get_test_state();

        let result = drag_allocation_endpoint(
            State(state),
            Json(DragForm {
                field: AllocationField::Savings,
                amount: 1_000_000,
            }),
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::NoAllocationSession);
    }

    #[tokio::test]
    async fn full_confirmation_flow() {
        let state = get_test_state();
        start_session(&state).await;

        // Pull savings down, leaving a surplus.
        let Json(drag) = drag_allocation_endpoint(
            State(state.clone()),
            Json(DragForm {
                field: AllocationField::Savings,
                amount: 1_500_000,
            }),
        )
        .await
        .unwrap();
        assert_eq!(drag.surplus, 500_000);

        for field in AllocationField::ALL {
            lock_allocation_endpoint(State(state.clone()), Json(FieldForm { field }))
                .await
                .unwrap();
        }

        let (status, Json(budget)) = confirm_allocation_endpoint(State(state.clone()))
            .await
            .expect("expected confirmation to succeed");

        assert_eq!(status, axum::http::StatusCode::CREATED);
        assert_eq!(budget.savings, 1_500_000);
        assert_eq!(budget.surplus, 500_000);

        // The session is gone, and the budget is readable.
        assert_eq!(
            current_allocation_endpoint(State(state.clone()))
                .await
                .unwrap_err(),
            Error::NoAllocationSession
        );
        let Json(latest) = latest_budget_endpoint(State(state)).await.unwrap();
        assert_eq!(latest, budget);
    }

    #[tokio::test]
    async fn confirm_with_unlocked_fields_is_rejected() {
        let state = get_test_state();
        start_session(&state).await;

        let result = confirm_allocation_endpoint(State(state)).await;

        assert_eq!(result.unwrap_err(), Error::UnconfirmedFields);
    }

    #[tokio::test]
    async fn locked_field_conflicts_on_drag() {
        let state = get_test_state();
        start_session(&state).await;
        lock_allocation_endpoint(
            State(state.clone()),
            Json(FieldForm {
                field: AllocationField::Pension,
            }),
        )
        .await
        .unwrap();

        let result = drag_allocation_endpoint(
            State(state),
            Json(DragForm {
                field: AllocationField::Pension,
                amount: 100_000,
            }),
        )
        .await;

        assert_eq!(
            result.unwrap_err(),
            Error::FieldLocked(AllocationField::Pension)
        );
    }
}
