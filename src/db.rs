//! Database schema creation and seeding.

use rusqlite::Connection;

use crate::{
    Error,
    allocation::create_adjusted_budget_table,
    course::{create_course_tables, seed_courses},
    ledger::create_spend_item_table,
    preferences::create_preference_table,
    wealth::{create_comparison_stat_table, create_financial_result_table},
};

/// Create every table the application needs and seed the course catalog.
///
/// Safe to run on every startup; tables and seeds are created only if
/// missing.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL
/// error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    create_spend_item_table(connection)?;
    create_adjusted_budget_table(connection)?;
    create_financial_result_table(connection)?;
    create_comparison_stat_table(connection)?;
    create_preference_table(connection)?;
    create_course_tables(connection)?;
    seed_courses(connection)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).unwrap();
        initialize(&conn).unwrap();

        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN
                 ('spend_item', 'adjusted_budget', 'financial_result', 'comparison_stat',
                  'preference', 'course', 'course_progress')",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(table_count, 7);
    }
}
