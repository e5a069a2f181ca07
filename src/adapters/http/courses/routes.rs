//! Axum router configuration for course endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::super::payments::handlers::begin_purchase;
use super::super::state::AppState;
use super::handlers::{
    create_course, create_lesson, delete_course, delete_lesson, get_course, get_lesson,
    list_courses, start_course, update_course, update_lesson,
};

/// Create the course API router, mounted at `/api/courses`.
///
/// # Routes
///
/// ## Public (optional authentication)
/// - `GET /` - List courses
/// - `GET /:course_id` - Course detail
/// - `GET /:course_id/lessons/:lesson_id` - Lesson content (access evaluator decides)
///
/// ## User Endpoints (require authentication)
/// - `POST /:course_id/start` - Start a course
/// - `POST /:course_id/purchase` - Begin a purchase
/// - `POST /` - Create a course
///
/// ## Author Endpoints (owner or superuser)
/// - `PATCH`, `DELETE /:course_id` - Edit or delete a course
/// - `POST /:course_id/lessons` - Add a lesson
/// - `PATCH`, `DELETE /:course_id/lessons/:lesson_id` - Edit or delete a lesson
pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route(
            "/:course_id",
            get(get_course).patch(update_course).delete(delete_course),
        )
        .route("/:course_id/lessons", post(create_lesson))
        .route(
            "/:course_id/lessons/:lesson_id",
            get(get_lesson).patch(update_lesson).delete(delete_lesson),
        )
        .route("/:course_id/start", post(start_course))
        .route("/:course_id/purchase", post(begin_purchase))
}
