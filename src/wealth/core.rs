//! The wealth index formula, its tier table, and the stored diagnostic
//! result.

use rusqlite::{Connection, Row, params};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{Error, database_id::FinancialResultId};

// ============================================================================
// MODELS
// ============================================================================

/// One tier of the wealth index scale.
///
/// Tiers are keyed by the upper bound of their index band; each band is
/// inclusive of its upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WealthTier {
    /// The discrete level, 1 through 5.
    pub level: u8,
    /// A short name for the tier.
    pub label: &'static str,
    /// The canned message shown with the tier.
    pub message: &'static str,
}

const TIERS: [WealthTier; 5] = [
    WealthTier {
        level: 1,
        label: "Laying the foundation",
        message: "Your debts outweigh your assets right now. Small, steady steps count.",
    },
    WealthTier {
        level: 2,
        label: "Getting started",
        message: "You are building your first cushion. Keep the savings habit going.",
    },
    WealthTier {
        level: 3,
        label: "On track",
        message: "Your net assets are about where they should be for your age and income.",
    },
    WealthTier {
        level: 4,
        label: "Ahead of the curve",
        message: "You have built more than expected for your age and income. Well done.",
    },
    WealthTier {
        level: 5,
        label: "Financially secure",
        message: "Your assets comfortably outpace your age and income. Protect what you built.",
    },
];

/// A stored run of the wealth diagnostic. Computed once from the form
/// inputs and never updated in place; re-running the form stores a new
/// result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialResult {
    /// The ID of the result.
    pub id: FinancialResultId,
    /// The name the user entered.
    pub name: String,
    /// The user's age in years.
    pub age: i64,
    /// Monthly income, in units of 10,000 won.
    pub monthly_income: i64,
    /// Total assets, in units of 10,000 won.
    pub assets: i64,
    /// Total debt, in units of 10,000 won.
    pub debt: i64,
    /// The computed wealth index.
    pub wealth_index: i64,
    /// The tier level the index maps to.
    pub level: u8,
    /// When the diagnostic was run.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The validated inputs of one diagnostic run, ready for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFinancialResult {
    /// The name the user entered.
    pub name: String,
    /// The user's age in years. Must be positive.
    pub age: i64,
    /// Monthly income, in units of 10,000 won. Must be positive.
    pub monthly_income: i64,
    /// Total assets, in units of 10,000 won.
    pub assets: i64,
    /// Total debt, in units of 10,000 won.
    pub debt: i64,
}

// ============================================================================
// DOMAIN FUNCTIONS
// ============================================================================

/// Compute the wealth index from the diagnostic inputs.
///
/// The index relates net assets to what someone of this age and income
/// could plausibly have accumulated:
///
/// `round((assets - debt) * 10 / (age * monthly_income * 12) * 100)`
///
/// # Errors
/// Returns [Error::NonPositiveWealthInput] when `age` or `monthly_income`
/// is zero or negative; the denominator must never be zero, and callers are
/// expected to validate positivity rather than rely on coercion.
pub fn compute_wealth_index(
    age: i64,
    monthly_income: i64,
    assets: i64,
    debt: i64,
) -> Result<i64, Error> {
    if age <= 0 {
        return Err(Error::NonPositiveWealthInput("age"));
    }
    if monthly_income <= 0 {
        return Err(Error::NonPositiveWealthInput("monthly income"));
    }

    let net_assets = (assets - debt) as f64;
    let expected = (age * monthly_income * 12) as f64;

    Ok((net_assets * 10.0 / expected * 100.0).round() as i64)
}

/// Map a wealth index to its tier.
///
/// Bands are inclusive of their upper bound: an index of exactly 50 is
/// still tier 2, and 200 is still tier 4.
pub fn tier_for_index(index: i64) -> &'static WealthTier {
    if index <= 0 {
        &TIERS[0]
    } else if index <= 50 {
        &TIERS[1]
    } else if index <= 100 {
        &TIERS[2]
    } else if index <= 200 {
        &TIERS[3]
    } else {
        &TIERS[4]
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Compute and store a diagnostic run.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveWealthInput] if age or income is not positive,
/// - or [Error::SqlError] if there is an SQL error.
pub fn store_financial_result(
    new: &NewFinancialResult,
    connection: &Connection,
) -> Result<FinancialResult, Error> {
    let wealth_index =
        compute_wealth_index(new.age, new.monthly_income, new.assets, new.debt)?;
    let level = tier_for_index(wealth_index).level;
    let created_at = OffsetDateTime::now_utc();

    let result = connection
        .prepare(
            "INSERT INTO financial_result
                (name, age, monthly_income, assets, debt, wealth_index, level, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id, name, age, monthly_income, assets, debt, wealth_index, level,
                created_at",
        )?
        .query_row(
            params![
                new.name,
                new.age,
                new.monthly_income,
                new.assets,
                new.debt,
                wealth_index,
                level,
                created_at,
            ],
            map_financial_result_row,
        )?;

    Ok(result)
}

/// Retrieve the most recent diagnostic run.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the diagnostic has never been run,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn latest_financial_result(connection: &Connection) -> Result<FinancialResult, Error> {
    let result = connection
        .prepare(
            "SELECT id, name, age, monthly_income, assets, debt, wealth_index, level,
                created_at
             FROM financial_result
             ORDER BY id DESC
             LIMIT 1",
        )?
        .query_one([], map_financial_result_row)?;

    Ok(result)
}

/// Create the financial_result table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL
/// error.
pub fn create_financial_result_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS financial_result (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                age INTEGER NOT NULL,
                monthly_income INTEGER NOT NULL,
                assets INTEGER NOT NULL,
                debt INTEGER NOT NULL,
                wealth_index INTEGER NOT NULL,
                level INTEGER NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

fn map_financial_result_row(row: &Row) -> Result<FinancialResult, rusqlite::Error> {
    Ok(FinancialResult {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        monthly_income: row.get(3)?,
        assets: row.get(4)?,
        debt: row.get(5)?,
        wealth_index: row.get(6)?,
        level: row.get(7)?,
        created_at: row.get(8)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::*;
    use crate::db::initialize;

    #[test]
    fn index_matches_reference_scenario() {
        // 40 years old, 500 monthly income, 65,000 assets, 40,000 debt:
        // round(25,000 * 10 / 240,000 * 100) = round(104.17) = 104.
        let got = compute_wealth_index(40, 500, 65_000, 40_000).unwrap();

        assert_eq!(got, 104);
        assert_eq!(tier_for_index(got).level, 4);
    }

    #[test]
    fn zero_age_or_income_is_an_error() {
        assert_eq!(
            compute_wealth_index(0, 500, 1_000, 0),
            Err(Error::NonPositiveWealthInput("age"))
        );
        assert_eq!(
            compute_wealth_index(40, 0, 1_000, 0),
            Err(Error::NonPositiveWealthInput("monthly income"))
        );
    }

    #[test]
    fn debt_above_assets_gives_bottom_tier() {
        let got = compute_wealth_index(30, 300, 5_000, 20_000).unwrap();

        assert!(got < 0);
        assert_eq!(tier_for_index(got).level, 1);
    }

    #[test]
    fn tier_bounds_are_inclusive() {
        assert_eq!(tier_for_index(0).level, 1);
        assert_eq!(tier_for_index(50).level, 2);
        assert_eq!(tier_for_index(100).level, 3);
        assert_eq!(tier_for_index(200).level, 4);
        assert_eq!(tier_for_index(201).level, 5);
    }

    #[test]
    fn store_and_read_back_latest() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let new = NewFinancialResult {
            name: "Jiyoung".to_owned(),
            age: 40,
            monthly_income: 500,
            assets: 65_000,
            debt: 40_000,
        };

        let stored = store_financial_result(&new, &conn).unwrap();

        assert_eq!(stored.wealth_index, 104);
        assert_eq!(stored.level, 4);
        assert_eq!(latest_financial_result(&conn).unwrap(), stored);
    }

    #[test]
    fn latest_without_any_run_is_not_found() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        assert_eq!(latest_financial_result(&conn), Err(Error::NotFound));
    }
}
