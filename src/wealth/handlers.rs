//! Wealth diagnostic HTTP handlers.

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
    app_state::lock_database,
    wealth::{
        FinancialResult, NewFinancialResult, WealthTier, latest_financial_result,
        record_comparison_stat, store_financial_result, tier_for_index,
        wealth_index_percentile,
    },
};

/// The state needed by the wealth handlers.
#[derive(Clone)]
pub struct WealthState {
    /// The database connection for diagnostic results.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for WealthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for running the wealth diagnostic.
#[derive(Debug, Deserialize)]
pub struct WealthForm {
    /// The name the user entered.
    #[serde(default)]
    pub name: String,
    /// The user's age in years.
    pub age: i64,
    /// Monthly income, in units of 10,000 won.
    pub monthly_income: i64,
    /// Total assets, in units of 10,000 won.
    pub assets: i64,
    /// Total debt, in units of 10,000 won.
    pub debt: i64,
}

/// A diagnostic result together with its tier's label and message.
#[derive(Debug, Serialize)]
pub struct WealthResponse {
    /// The stored result.
    #[serde(flatten)]
    pub result: FinancialResult,
    /// The tier the index maps to.
    pub tier: &'static WealthTier,
}

/// The age-group comparison of the latest diagnostic.
#[derive(Debug, Serialize)]
pub struct ComparisonResponse {
    /// The decade bucket the comparison covers, e.g. 40 for the forties.
    pub age_group: i64,
    /// The latest result's wealth index.
    pub wealth_index: i64,
    /// The share of recorded results in the bucket at or below this index,
    /// as a whole percentage. Absent when the bucket has no data yet.
    pub percentile: Option<u8>,
}

/// A route handler that runs and stores the wealth diagnostic.
///
/// Each run also contributes an anonymized row to the comparison pool.
pub async fn compute_wealth_endpoint(
    State(state): State<WealthState>,
    Json(form): Json<WealthForm>,
) -> Result<(StatusCode, Json<WealthResponse>), Error> {
    let new = NewFinancialResult {
        name: form.name,
        age: form.age,
        monthly_income: form.monthly_income,
        assets: form.assets,
        debt: form.debt,
    };

    let connection = lock_database(&state.db_connection)?;
    let result = store_financial_result(&new, &connection)?;
    record_comparison_stat(result.age, result.monthly_income, result.wealth_index, &connection)?;

    let tier = tier_for_index(result.wealth_index);

    Ok((StatusCode::CREATED, Json(WealthResponse { result, tier })))
}

/// A route handler for the most recent diagnostic result.
pub async fn latest_wealth_endpoint(
    State(state): State<WealthState>,
) -> Result<Json<WealthResponse>, Error> {
    let connection = lock_database(&state.db_connection)?;
    let result = latest_financial_result(&connection)?;
    let tier = tier_for_index(result.wealth_index);

    Ok(Json(WealthResponse { result, tier }))
}

/// A route handler comparing the latest diagnostic against its age group.
pub async fn wealth_comparison_endpoint(
    State(state): State<WealthState>,
) -> Result<Json<ComparisonResponse>, Error> {
    let connection = lock_database(&state.db_connection)?;
    let result = latest_financial_result(&connection)?;
    let percentile = wealth_index_percentile(result.age, result.wealth_index, &connection)?;

    Ok(Json(ComparisonResponse {
        age_group: crate::wealth::age_group(result.age),
        wealth_index: result.wealth_index,
        percentile,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State};
    use rusqlite::Connection;

    use super::*;
    use crate::db::initialize;

    fn get_test_state() -> WealthState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        WealthState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn reference_form() -> WealthForm {
        WealthForm {
            name: "Jiyoung".to_owned(),
            age: 40,
            monthly_income: 500,
            assets: 65_000,
            debt: 40_000,
        }
    }

    #[tokio::test]
    async fn compute_stores_and_classifies() {
        let state = get_test_state();

        let (status, Json(got)) =
            compute_wealth_endpoint(State(state.clone()), Json(reference_form()))
                .await
                .expect("expected the diagnostic to succeed");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(got.result.wealth_index, 104);
        assert_eq!(got.tier.level, 4);

        let Json(latest) = latest_wealth_endpoint(State(state)).await.unwrap();
        assert_eq!(latest.result.wealth_index, 104);
    }

    #[tokio::test]
    async fn zero_age_is_rejected() {
        let state = get_test_state();
        let form = WealthForm {
            age: 0,
            ..reference_form()
        };

        let result = compute_wealth_endpoint(State(state), Json(form)).await;

        assert_eq!(result.unwrap_err(), Error::NonPositiveWealthInput("age"));
    }

    #[tokio::test]
    async fn comparison_covers_the_age_group() {
        let state = get_test_state();
        compute_wealth_endpoint(State(state.clone()), Json(reference_form()))
            .await
            .unwrap();

        let Json(got) = wealth_comparison_endpoint(State(state)).await.unwrap();

        assert_eq!(got.age_group, 40);
        // The user's own run is in the pool, at or below itself.
        assert_eq!(got.percentile, Some(100));
    }

    #[tokio::test]
    async fn comparison_without_a_run_is_not_found() {
        let state = get_test_state();

        let result = wealth_comparison_endpoint(State(state)).await;

        assert_eq!(result.unwrap_err(), Error::NotFound);
    }
}
