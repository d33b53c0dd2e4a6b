//! Defines the endpoint for diagnosing an amount against its budget.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    allocation::{AllocationField, latest_adjusted_budget},
    app_state::lock_database,
    diagnostics::{Diagnosis, diagnose},
};

/// The state needed to diagnose an amount.
#[derive(Clone)]
pub struct DiagnoseState {
    /// The database connection for looking up the confirmed budget.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DiagnoseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for a diagnosis.
#[derive(Debug, Deserialize)]
pub struct DiagnoseForm {
    /// The budget category being diagnosed.
    pub category: AllocationField,
    /// The actual amount.
    pub current: i64,
    /// The budgeted amount. When absent, the category's amount from the
    /// most recently confirmed budget is used.
    #[serde(default)]
    pub budget: Option<i64>,
}

/// A route handler that classifies an amount against its budget.
pub async fn diagnose_endpoint(
    State(state): State<DiagnoseState>,
    Json(form): Json<DiagnoseForm>,
) -> Result<Json<Diagnosis>, Error> {
    let budget = match form.budget {
        Some(budget) => budget,
        None => {
            let connection = lock_database(&state.db_connection)?;
            let confirmed = latest_adjusted_budget(&connection)?;
            match form.category {
                AllocationField::LivingExpense => confirmed.living_expense,
                AllocationField::Savings => confirmed.savings,
                AllocationField::Pension => confirmed.pension,
                AllocationField::Insurance => confirmed.insurance,
                AllocationField::LoanPayment => confirmed.loan_payment,
            }
        }
    };

    Ok(Json(diagnose(form.category, form.current, budget)))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State};
    use rusqlite::Connection;

    use super::{DiagnoseForm, DiagnoseState, diagnose_endpoint};
    use crate::{
        Error,
        allocation::{AllocationField, NewAdjustedBudget, store_adjusted_budget},
        db::initialize,
        diagnostics::DiagnosisStatus,
    };

    fn get_test_state() -> DiagnoseState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        DiagnoseState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    #[tokio::test]
    async fn explicit_budget_is_used() {
        let state = get_test_state();

        let Json(got) = diagnose_endpoint(
            State(state),
            Json(DiagnoseForm {
                category: AllocationField::Savings,
                current: 600_000,
                budget: Some(500_000),
            }),
        )
        .await
        .unwrap();

        assert_eq!(got.status, DiagnosisStatus::Good);
    }

    #[tokio::test]
    async fn falls_back_to_confirmed_budget() {
        let state = get_test_state();
        {
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
        }

        let Json(got) = diagnose_endpoint(
            State(state),
            Json(DiagnoseForm {
                category: AllocationField::LivingExpense,
                current: 1_500_000,
                budget: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(got.status, DiagnosisStatus::Proper);
    }

    #[tokio::test]
    async fn missing_budget_without_confirmation_is_not_found() {
        let state = get_test_state();

        let result = diagnose_endpoint(
            State(state),
            Json(DiagnoseForm {
                category: AllocationField::Insurance,
                current: 100_000,
                budget: None,
            }),
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::NotFound);
    }
}
