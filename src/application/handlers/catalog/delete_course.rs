//! DeleteCourseHandler - Command handler for removing a course and its lessons.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::access::{can_edit, EditTarget};
use crate::domain::catalog::CatalogError;
use crate::domain::foundation::{CourseId, ErrorCode};
use crate::domain::user::Principal;
use crate::ports::{CatalogReader, CatalogRepository};

#[derive(Debug, Clone)]
pub struct DeleteCourseCommand {
    pub principal: Principal,
    pub course_id: CourseId,
}

pub struct DeleteCourseHandler {
    catalog: Arc<dyn CatalogReader>,
    courses: Arc<dyn CatalogRepository>,
}

impl DeleteCourseHandler {
    pub fn new(catalog: Arc<dyn CatalogReader>, courses: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog, courses }
    }

    /// A course with payment history is kept and reported as a conflict.
    pub async fn handle(&self, cmd: DeleteCourseCommand) -> Result<(), CatalogError> {
        let course = self
            .catalog
            .find_course(&cmd.course_id)
            .await?
            .ok_or_else(|| CatalogError::course_not_found(cmd.course_id))?;

        can_edit(&cmd.principal, EditTarget::Course(&course))
            .into_result()
            .map_err(|reason| {
                debug!(course_id = %course.id, reason = reason.code(), "course delete denied");
                CatalogError::access_denied(reason)
            })?;

        // Lost a race with another delete.
        self.courses
            .delete_course(&course.id)
            .await
            .map_err(|err| match err.code {
                ErrorCode::CourseNotFound => CatalogError::course_not_found(course.id),
                _ => err.into(),
            })?;

        info!(course_id = %course.id, "course deleted");
        Ok(())
    }
}
