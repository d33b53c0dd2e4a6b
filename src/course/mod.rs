//! The video course catalog and the user's watch progress.

mod core;
mod handlers;

pub use self::core::{
    Course, CourseWithProgress, create_course_tables, list_courses_with_progress, seed_courses,
    upsert_course_progress,
};
pub use handlers::{list_courses_endpoint, update_course_progress_endpoint};
