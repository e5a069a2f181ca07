//! HTTP handlers for course endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::catalog::{
    CreateCourseCommand, CreateLessonCommand, DeleteCourseCommand, DeleteLessonCommand,
    GetCourseQuery, GetLessonQuery, ListCoursesQuery, StartCourseCommand, StartCourseResult,
    UpdateCourseCommand, UpdateLessonCommand,
};
use crate::domain::catalog::{CatalogError, CourseChanges};
use crate::domain::foundation::{CourseId, LessonId};

use super::super::error::ApiError;
use super::super::middleware::{OptionalSession, Session};
use super::super::state::AppState;
use super::dto::{
    CourseDetailResponse, CourseListItem, CourseView, CreateCourseRequest, CreateLessonRequest,
    LessonResponse, StartCourseResponse, UpdateCourseRequest, UpdateLessonRequest,
};

/// GET /api/courses - List courses with lesson counts
pub async fn list_courses(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let summaries = state.list_courses_handler().handle(ListCoursesQuery).await?;
    let response: Vec<CourseListItem> = summaries.into_iter().map(CourseListItem::from).collect();
    Ok(Json(response))
}

/// GET /api/courses/:course_id - Course detail with access flags
pub async fn get_course(
    State(state): State<AppState>,
    OptionalSession(session): OptionalSession,
    Path(course_id): Path<CourseId>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = state.principal(session.as_ref()).await?;

    let detail = state
        .get_course_handler()
        .handle(GetCourseQuery {
            principal,
            course_id,
        })
        .await?;

    Ok(Json(CourseDetailResponse::from(detail)))
}

/// GET /api/courses/:course_id/lessons/:lesson_id - Lesson content
pub async fn get_lesson(
    State(state): State<AppState>,
    OptionalSession(session): OptionalSession,
    Path((course_id, lesson_id)): Path<(CourseId, LessonId)>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = state.principal(session.as_ref()).await?;

    let detail = state
        .get_lesson_handler()
        .handle(GetLessonQuery {
            principal,
            course_id,
            lesson_id,
        })
        .await?;

    Ok(Json(LessonResponse::from(detail)))
}

/// POST /api/courses/:course_id/start - Mark a course as started
pub async fn start_course(
    State(state): State<AppState>,
    Session(session): Session,
    Path(course_id): Path<CourseId>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = state.principal(Some(&session)).await?;

    let result = state
        .start_course_handler()
        .handle(StartCourseCommand {
            principal,
            course_id,
        })
        .await?;

    let status = match result {
        StartCourseResult::Started => StatusCode::CREATED,
        StartCourseResult::AlreadyStarted => StatusCode::OK,
    };
    Ok((status, Json(StartCourseResponse::from(result))))
}

/// POST /api/courses - Create a course owned by the caller
pub async fn create_course(
    State(state): State<AppState>,
    Session(session): Session,
    Json(request): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = state.principal(Some(&session)).await?;
    let pricing = request.pricing().map_err(CatalogError::from)?;

    let course = state
        .create_course_handler()
        .handle(CreateCourseCommand {
            principal,
            name: request.name,
            description: request.description,
            category: request.category,
            video_url: request.video_url,
            pricing,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CourseView::from(&course))))
}

/// PATCH /api/courses/:course_id - Edit a course (owner or superuser)
pub async fn update_course(
    State(state): State<AppState>,
    Session(session): Session,
    Path(course_id): Path<CourseId>,
    Json(request): Json<UpdateCourseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = state.principal(Some(&session)).await?;
    let changes = CourseChanges::try_from(request).map_err(CatalogError::from)?;

    let course = state
        .update_course_handler()
        .handle(UpdateCourseCommand {
            principal,
            course_id,
            changes,
        })
        .await?;

    Ok(Json(CourseView::from(&course)))
}

/// DELETE /api/courses/:course_id - Delete a course and its lessons
pub async fn delete_course(
    State(state): State<AppState>,
    Session(session): Session,
    Path(course_id): Path<CourseId>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = state.principal(Some(&session)).await?;

    state
        .delete_course_handler()
        .handle(DeleteCourseCommand {
            principal,
            course_id,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/courses/:course_id/lessons - Add a lesson
pub async fn create_lesson(
    State(state): State<AppState>,
    Session(session): Session,
    Path(course_id): Path<CourseId>,
    Json(request): Json<CreateLessonRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = state.principal(Some(&session)).await?;

    let lesson = state
        .create_lesson_handler()
        .handle(CreateLessonCommand {
            principal,
            course_id,
            name: request.name,
            description: request.description,
            video_url: request.video_url,
            position: request.position,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(LessonResponse::authored(lesson))))
}

/// PATCH /api/courses/:course_id/lessons/:lesson_id - Edit a lesson
pub async fn update_lesson(
    State(state): State<AppState>,
    Session(session): Session,
    Path((course_id, lesson_id)): Path<(CourseId, LessonId)>,
    Json(request): Json<UpdateLessonRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = state.principal(Some(&session)).await?;

    let lesson = state
        .update_lesson_handler()
        .handle(UpdateLessonCommand {
            principal,
            course_id,
            lesson_id,
            changes: request.into(),
        })
        .await?;

    Ok(Json(LessonResponse::authored(lesson)))
}

/// DELETE /api/courses/:course_id/lessons/:lesson_id - Delete a lesson
pub async fn delete_lesson(
    State(state): State<AppState>,
    Session(session): Session,
    Path((course_id, lesson_id)): Path<(CourseId, LessonId)>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = state.principal(Some(&session)).await?;

    state
        .delete_lesson_handler()
        .handle(DeleteLessonCommand {
            principal,
            course_id,
            lesson_id,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
