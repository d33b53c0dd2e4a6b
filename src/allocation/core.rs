//! Defines the confirmed budget snapshot and its database queries.

use rusqlite::{Connection, Row, params};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{Error, database_id::AdjustedBudgetId};

// ============================================================================
// MODELS
// ============================================================================

/// A confirmed five-way budget, immutable once written.
///
/// Re-running the allocation writes a new row; the current budget is always
/// the most recent one. Old snapshots are kept so past months keep their
/// context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedBudget {
    /// The ID of the snapshot.
    pub id: AdjustedBudgetId,
    /// The confirmed living expense amount.
    pub living_expense: i64,
    /// The confirmed savings amount.
    pub savings: i64,
    /// The confirmed pension amount.
    pub pension: i64,
    /// The confirmed insurance amount.
    pub insurance: i64,
    /// The confirmed loan repayment amount.
    pub loan_payment: i64,
    /// Income minus the sum of the five fields. Never negative.
    pub surplus: i64,
    /// The monthly income the budget allocates.
    pub total_income: i64,
    /// When the budget was confirmed.
    #[serde(with = "time::serde::rfc3339")]
    pub confirmed_at: OffsetDateTime,
}

/// The five confirmed amounts and the income, ready for storage.
///
/// Produced by [crate::allocation::AllocationSession::confirm]. The surplus
/// is not carried here; storage recomputes it from the fields so the
/// invariant `surplus = total_income - sum(fields)` holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewAdjustedBudget {
    /// The confirmed living expense amount.
    pub living_expense: i64,
    /// The confirmed savings amount.
    pub savings: i64,
    /// The confirmed pension amount.
    pub pension: i64,
    /// The confirmed insurance amount.
    pub insurance: i64,
    /// The confirmed loan repayment amount.
    pub loan_payment: i64,
    /// The monthly income the budget allocates.
    pub total_income: i64,
}

impl NewAdjustedBudget {
    /// The sum of the five confirmed amounts.
    pub fn allocated(&self) -> i64 {
        self.living_expense + self.savings + self.pension + self.insurance + self.loan_payment
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Store a confirmed budget as a new snapshot.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeSurplus] if the fields sum to more than the income,
/// - or [Error::SqlError] if there is an SQL error.
pub fn store_adjusted_budget(
    budget: &NewAdjustedBudget,
    connection: &Connection,
) -> Result<AdjustedBudget, Error> {
    let surplus = budget.total_income - budget.allocated();
    if surplus < 0 {
        return Err(Error::NegativeSurplus(-surplus));
    }

    let confirmed_at = OffsetDateTime::now_utc();

    let stored = connection
        .prepare(
            "INSERT INTO adjusted_budget
                (living_expense, savings, pension, insurance, loan_payment, surplus,
                 total_income, confirmed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id, living_expense, savings, pension, insurance, loan_payment,
                surplus, total_income, confirmed_at",
        )?
        .query_row(
            params![
                budget.living_expense,
                budget.savings,
                budget.pension,
                budget.insurance,
                budget.loan_payment,
                surplus,
                budget.total_income,
                confirmed_at,
            ],
            map_adjusted_budget_row,
        )?;

    Ok(stored)
}

/// Retrieve the most recently confirmed budget.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if no budget has been confirmed yet,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn latest_adjusted_budget(connection: &Connection) -> Result<AdjustedBudget, Error> {
    let budget = connection
        .prepare(
            "SELECT id, living_expense, savings, pension, insurance, loan_payment,
                surplus, total_income, confirmed_at
             FROM adjusted_budget
             ORDER BY id DESC
             LIMIT 1",
        )?
        .query_one([], map_adjusted_budget_row)?;

    Ok(budget)
}

/// Create the adjusted_budget table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL
/// error.
pub fn create_adjusted_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS adjusted_budget (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                living_expense INTEGER NOT NULL,
                savings INTEGER NOT NULL,
                pension INTEGER NOT NULL,
                insurance INTEGER NOT NULL,
                loan_payment INTEGER NOT NULL,
                surplus INTEGER NOT NULL,
                total_income INTEGER NOT NULL,
                confirmed_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

fn map_adjusted_budget_row(row: &Row) -> Result<AdjustedBudget, rusqlite::Error> {
    Ok(AdjustedBudget {
        id: row.get(0)?,
        living_expense: row.get(1)?,
        savings: row.get(2)?,
        pension: row.get(3)?,
        insurance: row.get(4)?,
        loan_payment: row.get(5)?,
        surplus: row.get(6)?,
        total_income: row.get(7)?,
        confirmed_at: row.get(8)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
