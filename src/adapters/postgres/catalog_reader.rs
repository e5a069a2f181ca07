//! PostgreSQL implementation of CatalogReader.

use crate::domain::catalog::{Course, CourseCategory, CoursePricing, Lesson};
use crate::domain::foundation::{
    CourseId, DomainError, ErrorCode, LessonId, Timestamp, UserId,
};
use crate::ports::{CatalogReader, CourseSummary};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the CatalogReader port.
pub struct PostgresCatalogReader {
    pool: PgPool,
}

impl PostgresCatalogReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    category: Option<String>,
    video_url: Option<String>,
    owner_id: Option<Uuid>,
    is_paid: bool,
    price: Option<Decimal>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct CourseSummaryRow {
    #[sqlx(flatten)]
    course: CourseRow,
    lesson_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct LessonRow {
    id: Uuid,
    course_id: Uuid,
    name: String,
    description: Option<String>,
    video_url: Option<String>,
    owner_id: Option<Uuid>,
    position: i32,
    created_at: DateTime<Utc>,
}

fn corrupt(what: &str, id: Uuid, e: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} on row {}: {}", what, id, e),
    )
}

impl TryFrom<CourseRow> for Course {
    type Error = DomainError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let pricing =
            CoursePricing::from_parts(row.is_paid, row.price).map_err(|e| corrupt("pricing", row.id, e))?;
        let category = row
            .category
            .as_deref()
            .map(str::parse::<CourseCategory>)
            .transpose()
            .map_err(|e| corrupt("category", row.id, e))?;

        Ok(Course {
            id: CourseId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            category,
            video_url: row.video_url,
            owner: row.owner_id.map(UserId::from_uuid),
            pricing,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

impl TryFrom<LessonRow> for Lesson {
    type Error = DomainError;

    fn try_from(row: LessonRow) -> Result<Self, Self::Error> {
        let position = u32::try_from(row.position).map_err(|e| corrupt("position", row.id, e))?;
        Ok(Lesson {
            id: LessonId::from_uuid(row.id),
            course_id: CourseId::from_uuid(row.course_id),
            name: row.name,
            description: row.description,
            video_url: row.video_url,
            owner: row.owner_id.map(UserId::from_uuid),
            position,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    DomainError::database(format!("{}: {}", context, err))
}

#[async_trait]
impl CatalogReader for PostgresCatalogReader {
    async fn find_course(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        let row: Option<CourseRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, category, video_url, owner_id, is_paid, price, created_at
            FROM courses WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load course", e))?;

        row.map(Course::try_from).transpose()
    }

    async fn find_lesson(&self, id: &LessonId) -> Result<Option<Lesson>, DomainError> {
        let row: Option<LessonRow> = sqlx::query_as(
            r#"
            SELECT id, course_id, name, description, video_url, owner_id, position, created_at
            FROM lessons WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load lesson", e))?;

        row.map(Lesson::try_from).transpose()
    }

    async fn list_courses(&self) -> Result<Vec<CourseSummary>, DomainError> {
        let rows: Vec<CourseSummaryRow> = sqlx::query_as(
            r#"
            SELECT c.id, c.name, c.description, c.category, c.video_url, c.owner_id,
                   c.is_paid, c.price, c.created_at,
                   (SELECT COUNT(*) FROM lessons l WHERE l.course_id = c.id) AS lesson_count
            FROM courses c
            ORDER BY c.created_at DESC, c.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list courses", e))?;

        rows.into_iter()
            .map(|row| {
                let lesson_count = u32::try_from(row.lesson_count).unwrap_or(u32::MAX);
                Ok(CourseSummary {
                    course: Course::try_from(row.course)?,
                    lesson_count,
                })
            })
            .collect()
    }

    async fn list_lessons(&self, course_id: &CourseId) -> Result<Vec<Lesson>, DomainError> {
        let rows: Vec<LessonRow> = sqlx::query_as(
            r#"
            SELECT id, course_id, name, description, video_url, owner_id, position, created_at
            FROM lessons WHERE course_id = $1
            ORDER BY position, created_at
            "#,
        )
        .bind(course_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list lessons", e))?;

        rows.into_iter().map(Lesson::try_from).collect()
    }
}
