//! HTTP adapter for course endpoints.
//!
//! Exposes the catalog via REST API:
//! - `GET /api/courses` - List courses
//! - `GET /api/courses/:course_id` - Course detail
//! - `GET /api/courses/:course_id/lessons/:lesson_id` - Lesson content
//! - `POST /api/courses/:course_id/start` - Start a course
//! - `POST /api/courses/:course_id/purchase` - Begin a purchase
//! - `POST`, `PATCH`, `DELETE` on courses and lessons - Authoring

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use routes::course_routes;
