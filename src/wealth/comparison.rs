//! Cross-user comparison of wealth index results.
//!
//! Every diagnostic run contributes an anonymized row (age-group bucket,
//! income band, index) to the comparison pool. Reading is a full scan of
//! one age-group bucket with no pagination; that is O(n) in the bucket
//! size and only acceptable because the pool stays small. Noted as a
//! scaling risk, not a design goal.

use rusqlite::{Connection, params};

use crate::Error;

/// The width of an income band, in units of 10,000 won.
const INCOME_BAND_WIDTH: i64 = 100;

/// Bucket an age into its decade group, e.g. 37 -> 30.
pub fn age_group(age: i64) -> i64 {
    (age / 10) * 10
}

/// Bucket a monthly income into its band.
fn income_band(monthly_income: i64) -> i64 {
    (monthly_income / INCOME_BAND_WIDTH) * INCOME_BAND_WIDTH
}

/// Record one anonymized diagnostic outcome into the comparison pool.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn record_comparison_stat(
    age: i64,
    monthly_income: i64,
    wealth_index: i64,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO comparison_stat (age_group, income_band, wealth_index)
         VALUES (?1, ?2, ?3)",
        params![age_group(age), income_band(monthly_income), wealth_index],
    )?;

    Ok(())
}

/// The percentile of a wealth index within its age-group bucket.
///
/// Returns the share of recorded results in the bucket with an index no
/// greater than the given one, as a whole percentage, or `None` when the
/// bucket is empty.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn wealth_index_percentile(
    age: i64,
    wealth_index: i64,
    connection: &Connection,
) -> Result<Option<u8>, Error> {
    let mut statement =
        connection.prepare("SELECT wealth_index FROM comparison_stat WHERE age_group = ?1")?;

    let indexes = statement
        .query_map(params![age_group(age)], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    if indexes.is_empty() {
        return Ok(None);
    }

    let at_or_below = indexes.iter().filter(|&&index| index <= wealth_index).count();
    let percentile = (at_or_below * 100 / indexes.len()) as u8;

    Ok(Some(percentile))
}

/// Create the comparison_stat table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL
/// error.
pub fn create_comparison_stat_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS comparison_stat (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                age_group INTEGER NOT NULL,
                income_band INTEGER NOT NULL,
                wealth_index INTEGER NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_comparison_stat_age_group
         ON comparison_stat(age_group);",
        (),
    )?;

    Ok(())
}
