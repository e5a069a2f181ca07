//! DeleteLessonHandler - Command handler for removing a lesson.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::access::{can_edit, EditTarget};
use crate::domain::catalog::CatalogError;
use crate::domain::foundation::{CourseId, ErrorCode, LessonId};
use crate::domain::user::Principal;
use crate::ports::{CatalogReader, CatalogRepository};

#[derive(Debug, Clone)]
pub struct DeleteLessonCommand {
    pub principal: Principal,
    pub course_id: CourseId,
    pub lesson_id: LessonId,
}

pub struct DeleteLessonHandler {
    catalog: Arc<dyn CatalogReader>,
    lessons: Arc<dyn CatalogRepository>,
}

impl DeleteLessonHandler {
    pub fn new(catalog: Arc<dyn CatalogReader>, lessons: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog, lessons }
    }

    pub async fn handle(&self, cmd: DeleteLessonCommand) -> Result<(), CatalogError> {
        let course = self
            .catalog
            .find_course(&cmd.course_id)
            .await?
            .ok_or_else(|| CatalogError::course_not_found(cmd.course_id))?;

        let lesson = self
            .catalog
            .find_lesson(&cmd.lesson_id)
            .await?
            .filter(|lesson| lesson.belongs_to(&course.id))
            .ok_or_else(|| CatalogError::lesson_not_found(cmd.lesson_id))?;

        can_edit(
            &cmd.principal,
            EditTarget::Lesson {
                lesson: &lesson,
                course: &course,
            },
        )
        .into_result()
        .map_err(|reason| {
            debug!(lesson_id = %lesson.id, reason = reason.code(), "lesson delete denied");
            CatalogError::access_denied(reason)
        })?;

        self.lessons
            .delete_lesson(&lesson.id)
            .await
            .map_err(|err| match err.code {
                ErrorCode::LessonNotFound => CatalogError::lesson_not_found(lesson.id),
                _ => err.into(),
            })?;

        info!(course_id = %course.id, lesson_id = %lesson.id, "lesson deleted");
        Ok(())
    }
}
