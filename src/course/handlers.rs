//! Course catalog HTTP handlers.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    app_state::lock_database,
    course::{CourseWithProgress, list_courses_with_progress, upsert_course_progress},
    database_id::CourseId,
};

/// The state needed by the course handlers.
#[derive(Clone)]
pub struct CourseState {
    /// The database connection for the catalog and progress.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CourseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for recording watch progress.
#[derive(Debug, Deserialize)]
pub struct ProgressForm {
    /// How many seconds of the course have been watched.
    pub watched_seconds: i64,
    /// Whether the user has finished the course.
    #[serde(default)]
    pub completed: bool,
}

/// A route handler for the catalog with watch progress attached.
pub async fn list_courses_endpoint(
    State(state): State<CourseState>,
) -> Result<Json<Vec<CourseWithProgress>>, Error> {
    let connection = lock_database(&state.db_connection)?;
    let courses = list_courses_with_progress(&connection)?;

    Ok(Json(courses))
}

/// A route handler that records watch progress for one course.
pub async fn update_course_progress_endpoint(
    State(state): State<CourseState>,
    Path(course_id): Path<CourseId>,
    Json(form): Json<ProgressForm>,
) -> Result<Json<CourseWithProgress>, Error> {
    let connection = lock_database(&state.db_connection)?;
    let course =
        upsert_course_progress(course_id, form.watched_seconds, form.completed, &connection)?;

    Ok(Json(course))
}
