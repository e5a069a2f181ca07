//! Catalog reader port (read side).

use crate::domain::catalog::{Course, Lesson};
use crate::domain::foundation::{CourseId, DomainError, LessonId};
use async_trait::async_trait;

/// Queries over courses and lessons.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn find_course(&self, id: &CourseId) -> Result<Option<Course>, DomainError>;

    async fn find_lesson(&self, id: &LessonId) -> Result<Option<Lesson>, DomainError>;

    /// All courses with their lesson counts, newest first.
    async fn list_courses(&self) -> Result<Vec<CourseSummary>, DomainError>;

    /// Lessons of one course ordered by position.
    async fn list_lessons(&self, course_id: &CourseId) -> Result<Vec<Lesson>, DomainError>;
}

/// A course row in the catalog listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSummary {
    pub course: Course,
    pub lesson_count: u32,
}
