//! Catalog repository port (write side).
//!
//! Authorisation happens before these calls; implementations only persist.

use crate::domain::catalog::{Course, Lesson};
use crate::domain::foundation::{CourseId, DomainError, LessonId};
use async_trait::async_trait;

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn save_course(&self, course: &Course) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `CourseNotFound` if the course does not exist
    async fn update_course(&self, course: &Course) -> Result<(), DomainError>;

    /// Delete a course and its lessons.
    ///
    /// # Errors
    ///
    /// - `CourseNotFound` if the course does not exist
    /// - `Conflict` if payments reference the course
    async fn delete_course(&self, id: &CourseId) -> Result<(), DomainError>;

    async fn save_lesson(&self, lesson: &Lesson) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `LessonNotFound` if the lesson does not exist
    async fn update_lesson(&self, lesson: &Lesson) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `LessonNotFound` if the lesson does not exist
    async fn delete_lesson(&self, id: &LessonId) -> Result<(), DomainError>;
}
