//! GetLessonHandler - Query handler for lesson content, gated by the
//! access evaluator.

use std::sync::Arc;

use tracing::debug;

use crate::domain::access::{can_edit, can_view_lesson, EditTarget};
use crate::domain::catalog::{CatalogError, Lesson};
use crate::domain::foundation::{CourseId, LessonId};
use crate::domain::user::Principal;
use crate::ports::CatalogReader;

/// Query for one lesson of one course.
#[derive(Debug, Clone)]
pub struct GetLessonQuery {
    pub principal: Principal,
    pub course_id: CourseId,
    pub lesson_id: LessonId,
}

#[derive(Debug, Clone)]
pub struct LessonDetail {
    pub lesson: Lesson,
    pub can_edit: bool,
}

pub struct GetLessonHandler {
    catalog: Arc<dyn CatalogReader>,
}

impl GetLessonHandler {
    pub fn new(catalog: Arc<dyn CatalogReader>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, query: GetLessonQuery) -> Result<LessonDetail, CatalogError> {
        let course = self
            .catalog
            .find_course(&query.course_id)
            .await?
            .ok_or_else(|| CatalogError::course_not_found(query.course_id))?;

        // A lesson addressed through a course it does not belong to does not exist.
        let lesson = self
            .catalog
            .find_lesson(&query.lesson_id)
            .await?
            .filter(|lesson| lesson.belongs_to(&course.id))
            .ok_or_else(|| CatalogError::lesson_not_found(query.lesson_id))?;

        can_view_lesson(&query.principal, &course, &lesson)
            .into_result()
            .map_err(|reason| {
                debug!(
                    lesson_id = %lesson.id,
                    reason = reason.code(),
                    "lesson access denied"
                );
                CatalogError::access_denied(reason)
            })?;

        let can_edit = can_edit(
            &query.principal,
            EditTarget::Lesson {
                lesson: &lesson,
                course: &course,
            },
        )
        .is_granted();

        Ok(LessonDetail { lesson, can_edit })
    }
}
