//! UpdateCourseHandler - Command handler for editing a course.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::access::{can_edit, EditTarget};
use crate::domain::catalog::{CatalogError, Course, CourseChanges};
use crate::domain::foundation::CourseId;
use crate::domain::user::Principal;
use crate::ports::{CatalogReader, CatalogRepository};

#[derive(Debug, Clone)]
pub struct UpdateCourseCommand {
    pub principal: Principal,
    pub course_id: CourseId,
    pub changes: CourseChanges,
}

pub struct UpdateCourseHandler {
    catalog: Arc<dyn CatalogReader>,
    courses: Arc<dyn CatalogRepository>,
}

impl UpdateCourseHandler {
    pub fn new(catalog: Arc<dyn CatalogReader>, courses: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog, courses }
    }

    /// Returns the course as stored after the edit.
    pub async fn handle(&self, cmd: UpdateCourseCommand) -> Result<Course, CatalogError> {
        let mut course = self
            .catalog
            .find_course(&cmd.course_id)
            .await?
            .ok_or_else(|| CatalogError::course_not_found(cmd.course_id))?;

        can_edit(&cmd.principal, EditTarget::Course(&course))
            .into_result()
            .map_err(|reason| {
                debug!(course_id = %course.id, reason = reason.code(), "course edit denied");
                CatalogError::access_denied(reason)
            })?;

        if cmd.changes.is_empty() {
            return Ok(course);
        }

        course.apply(cmd.changes)?;
        self.courses.update_course(&course).await?;

        info!(course_id = %course.id, "course updated");
        Ok(course)
    }
}
