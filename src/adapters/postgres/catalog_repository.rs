//! PostgreSQL implementation of CatalogRepository.
//!
//! Lessons and course grants cascade with their course. Payments do not, so
//! a course with payment history cannot be deleted.

use crate::domain::catalog::{Course, Lesson};
use crate::domain::foundation::{CourseId, DomainError, ErrorCode, LessonId};
use crate::ports::CatalogRepository;
use async_trait::async_trait;
use sqlx::postgres::PgQueryResult;
use sqlx::PgPool;

const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL implementation of the CatalogRepository port.
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn sql_state(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    }
}

fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    DomainError::database(format!("{}: {}", context, err))
}

fn position(lesson: &Lesson) -> Result<i32, DomainError> {
    i32::try_from(lesson.position).map_err(|_| {
        DomainError::new(ErrorCode::ValidationFailed, "Lesson position is too large")
            .with_detail("field", "position")
    })
}

fn require_row(
    result: PgQueryResult,
    code: ErrorCode,
    message: impl FnOnce() -> String,
) -> Result<(), DomainError> {
    if result.rows_affected() == 0 {
        Err(DomainError::new(code, message()))
    } else {
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn save_course(&self, course: &Course) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO courses (
                id, name, description, category, video_url, owner_id, is_paid, price, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(course.id.as_uuid())
        .bind(&course.name)
        .bind(&course.description)
        .bind(course.category.map(|c| c.as_str()))
        .bind(&course.video_url)
        .bind(course.owner.map(|o| *o.as_uuid()))
        .bind(course.pricing.is_paid())
        .bind(course.pricing.price().map(|p| p.amount()))
        .bind(course.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| match sql_state(&e).as_deref() {
            Some(UNIQUE_VIOLATION) => DomainError::new(ErrorCode::Conflict, "Course already exists"),
            _ => db_error("Failed to save course", e),
        })?;

        Ok(())
    }

    async fn update_course(&self, course: &Course) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE courses
            SET name = $2, description = $3, category = $4, video_url = $5,
                is_paid = $6, price = $7
            WHERE id = $1
            "#,
        )
        .bind(course.id.as_uuid())
        .bind(&course.name)
        .bind(&course.description)
        .bind(course.category.map(|c| c.as_str()))
        .bind(&course.video_url)
        .bind(course.pricing.is_paid())
        .bind(course.pricing.price().map(|p| p.amount()))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update course", e))?;

        require_row(result, ErrorCode::CourseNotFound, || {
            format!("Course not found: {}", course.id)
        })
    }

    async fn delete_course(&self, id: &CourseId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| match sql_state(&e).as_deref() {
                Some(FOREIGN_KEY_VIOLATION) => DomainError::new(
                    ErrorCode::Conflict,
                    "Course has payments and cannot be deleted",
                ),
                _ => db_error("Failed to delete course", e),
            })?;

        require_row(result, ErrorCode::CourseNotFound, || {
            format!("Course not found: {}", id)
        })
    }

    async fn save_lesson(&self, lesson: &Lesson) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO lessons (
                id, course_id, name, description, video_url, owner_id, position, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(lesson.id.as_uuid())
        .bind(lesson.course_id.as_uuid())
        .bind(&lesson.name)
        .bind(&lesson.description)
        .bind(&lesson.video_url)
        .bind(lesson.owner.map(|o| *o.as_uuid()))
        .bind(position(lesson)?)
        .bind(lesson.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| match sql_state(&e).as_deref() {
            Some(FOREIGN_KEY_VIOLATION) => DomainError::new(
                ErrorCode::CourseNotFound,
                format!("Course not found: {}", lesson.course_id),
            ),
            Some(UNIQUE_VIOLATION) => DomainError::new(ErrorCode::Conflict, "Lesson already exists"),
            _ => db_error("Failed to save lesson", e),
        })?;

        Ok(())
    }

    async fn update_lesson(&self, lesson: &Lesson) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE lessons
            SET name = $2, description = $3, video_url = $4, position = $5
            WHERE id = $1
            "#,
        )
        .bind(lesson.id.as_uuid())
        .bind(&lesson.name)
        .bind(&lesson.description)
        .bind(&lesson.video_url)
        .bind(position(lesson)?)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update lesson", e))?;

        require_row(result, ErrorCode::LessonNotFound, || {
            format!("Lesson not found: {}", lesson.id)
        })
    }

    async fn delete_lesson(&self, id: &LessonId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete lesson", e))?;

        require_row(result, ErrorCode::LessonNotFound, || {
            format!("Lesson not found: {}", id)
        })
    }
}
