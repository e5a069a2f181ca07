//! CreateLessonHandler - Command handler for adding a lesson to a course.
//!
//! Requires edit rights on the course. The author owns the new lesson.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::access::{can_edit, EditTarget};
use crate::domain::catalog::{CatalogError, Lesson};
use crate::domain::foundation::CourseId;
use crate::domain::user::Principal;
use crate::ports::{CatalogReader, CatalogRepository};

#[derive(Debug, Clone)]
pub struct CreateLessonCommand {
    pub principal: Principal,
    pub course_id: CourseId,
    pub name: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    /// Appended after the existing lessons when absent.
    pub position: Option<u32>,
}

pub struct CreateLessonHandler {
    catalog: Arc<dyn CatalogReader>,
    lessons: Arc<dyn CatalogRepository>,
}

impl CreateLessonHandler {
    pub fn new(catalog: Arc<dyn CatalogReader>, lessons: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog, lessons }
    }

    pub async fn handle(&self, cmd: CreateLessonCommand) -> Result<Lesson, CatalogError> {
        let course = self
            .catalog
            .find_course(&cmd.course_id)
            .await?
            .ok_or_else(|| CatalogError::course_not_found(cmd.course_id))?;

        can_edit(&cmd.principal, EditTarget::Course(&course))
            .into_result()
            .map_err(|reason| {
                debug!(course_id = %course.id, reason = reason.code(), "lesson create denied");
                CatalogError::access_denied(reason)
            })?;

        let position = match cmd.position {
            Some(position) => position,
            None => {
                let existing = self.catalog.list_lessons(&course.id).await?;
                u32::try_from(existing.len()).unwrap_or(u32::MAX)
            }
        };

        let mut lesson = Lesson::new(course.id, cmd.name, cmd.principal.user_id().copied())?
            .with_position(position);
        lesson.description = cmd.description;
        lesson.video_url = cmd.video_url;

        self.lessons.save_lesson(&lesson).await?;

        info!(course_id = %course.id, lesson_id = %lesson.id, "lesson created");
        Ok(lesson)
    }
}
