//! Defines the course catalog models and database queries.
//!
//! The catalog itself is seeded at initialization and read-only; only the
//! watch progress changes, and every progress write is a full-row upsert.

use rusqlite::{Connection, Row, params};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{Error, database_id::CourseId};

// ============================================================================
// MODELS
// ============================================================================

/// One video course in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Course {
    /// The ID of the course.
    pub id: CourseId,
    /// The course title.
    pub title: String,
    /// The catalog section the course belongs to.
    pub category: String,
    /// How long the course runs, in minutes.
    pub duration_minutes: i64,
    /// The course's position within the catalog.
    pub position: i64,
}

/// A course together with the user's watch progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseWithProgress {
    /// The course.
    #[serde(flatten)]
    pub course: Course,
    /// How many seconds of the course have been watched.
    pub watched_seconds: i64,
    /// Whether the user has finished the course.
    pub completed: bool,
}

/// The seeded catalog: (id, title, category, duration in minutes).
const CATALOG: [(i64, &str, &str, i64); 6] = [
    (1, "Reading Your Spending Diary", "habits", 12),
    (2, "Building Your First Monthly Budget", "budgeting", 18),
    (3, "The Five-Way Split Explained", "budgeting", 15),
    (4, "Emergency Funds Before Investing", "saving", 14),
    (5, "Pension Basics for Beginners", "saving", 21),
    (6, "Paying Down Debt Without Burning Out", "debt", 17),
];

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// List the whole catalog in order, with the user's progress attached.
///
/// Courses the user has never opened report zero progress.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_courses_with_progress(
    connection: &Connection,
) -> Result<Vec<CourseWithProgress>, Error> {
    let mut statement = connection.prepare(
        "SELECT c.id, c.title, c.category, c.duration_minutes, c.position,
                COALESCE(p.watched_seconds, 0), COALESCE(p.completed, 0)
         FROM course c
         LEFT JOIN course_progress p ON p.course_id = c.id
         ORDER BY c.position",
    )?;

    let courses = statement
        .query_map([], map_course_with_progress_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(courses)
}

/// Record watch progress for one course, replacing any earlier progress.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the course does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn upsert_course_progress(
    course_id: CourseId,
    watched_seconds: i64,
    completed: bool,
    connection: &Connection,
) -> Result<CourseWithProgress, Error> {
    let updated_at = OffsetDateTime::now_utc();

    let rows_affected = connection.execute(
        "INSERT INTO course_progress (course_id, watched_seconds, completed, updated_at)
         SELECT id, ?2, ?3, ?4 FROM course WHERE id = ?1
         ON CONFLICT(course_id) DO UPDATE SET
            watched_seconds = excluded.watched_seconds,
            completed = excluded.completed,
            updated_at = excluded.updated_at",
        params![course_id, watched_seconds, completed, updated_at],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    let course = connection
        .prepare(
            "SELECT c.id, c.title, c.category, c.duration_minutes, c.position,
                    p.watched_seconds, p.completed
             FROM course c
             JOIN course_progress p ON p.course_id = c.id
             WHERE c.id = ?1",
        )?
        .query_one(params![course_id], map_course_with_progress_row)?;

    Ok(course)
}

/// Create the course tables in the database.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL
/// error.
pub fn create_course_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS course (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                category TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                position INTEGER NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS course_progress (
                course_id INTEGER PRIMARY KEY,
                watched_seconds INTEGER NOT NULL,
                completed INTEGER NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(course_id) REFERENCES course(id) ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Seed the course catalog. Safe to run on every startup.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn seed_courses(connection: &Connection) -> Result<(), rusqlite::Error> {
    for (position, (id, title, category, duration_minutes)) in CATALOG.iter().enumerate() {
        connection.execute(
            "INSERT OR IGNORE INTO course (id, title, category, duration_minutes, position)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, title, category, duration_minutes, position as i64],
        )?;
    }

    Ok(())
}

fn map_course_with_progress_row(row: &Row) -> Result<CourseWithProgress, rusqlite::Error> {
    Ok(CourseWithProgress {
        course: Course {
            id: row.get(0)?,
            title: row.get(1)?,
            category: row.get(2)?,
            duration_minutes: row.get(3)?,
            position: row.get(4)?,
        },
        watched_seconds: row.get(5)?,
        completed: row.get(6)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;

    use super::*;
    use crate::db::initialize;

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn catalog_is_seeded_without_progress() {
        let conn = get_test_connection();

        let got = list_courses_with_progress(&conn).unwrap();

        assert_eq!(got.len(), 6);
        assert!(got.iter().all(|c| c.watched_seconds == 0 && !c.completed));
    }

    #[test]
    fn seeding_twice_does_not_duplicate() {
        let conn = get_test_connection();

        seed_courses(&conn).unwrap();

        assert_eq!(list_courses_with_progress(&conn).unwrap().len(), 6);
    }

    #[test]
    fn progress_round_trips_and_replaces() {
        let conn = get_test_connection();

        upsert_course_progress(2, 300, false, &conn).unwrap();
        let got = upsert_course_progress(2, 1_080, true, &conn).unwrap();

        assert_eq!(got.watched_seconds, 1_080);
        assert!(got.completed);

        let listed = list_courses_with_progress(&conn).unwrap();
        let course = listed.iter().find(|c| c.course.id == 2).unwrap();
        assert_eq!(course.watched_seconds, 1_080);
    }

    #[test]
    fn progress_for_unknown_course_is_not_found() {
        let conn = get_test_connection();

        let result = upsert_course_progress(99, 10, false, &conn);

        assert_eq!(result, Err(Error::NotFound));
    }
}
