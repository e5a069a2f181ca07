//! Catalog handlers.
//!
//! ## Commands
//! - Starting a course
//! - Creating, editing and deleting courses and lessons, gated by `can_edit`
//!
//! ## Queries
//! - Course list with lesson counts
//! - Course detail with access flags
//! - Lesson detail, gated by the access evaluator

mod create_course;
mod create_lesson;
mod delete_course;
mod delete_lesson;
mod get_course;
mod get_lesson;
mod list_courses;
mod start_course;
mod update_course;
mod update_lesson;

// Commands
pub use create_course::{CreateCourseCommand, CreateCourseHandler};
pub use create_lesson::{CreateLessonCommand, CreateLessonHandler};
pub use delete_course::{DeleteCourseCommand, DeleteCourseHandler};
pub use delete_lesson::{DeleteLessonCommand, DeleteLessonHandler};
pub use start_course::{StartCourseCommand, StartCourseHandler, StartCourseResult};
pub use update_course::{UpdateCourseCommand, UpdateCourseHandler};
pub use update_lesson::{UpdateLessonCommand, UpdateLessonHandler};

// Queries
pub use get_course::{CourseDetail, GetCourseHandler, GetCourseQuery};
pub use get_lesson::{GetLessonHandler, GetLessonQuery, LessonDetail};
pub use list_courses::{ListCoursesHandler, ListCoursesQuery};
