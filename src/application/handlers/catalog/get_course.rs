//! GetCourseHandler - Query handler for course detail.

use std::sync::Arc;

use crate::domain::access::{can_edit, can_view_course, EditTarget};
use crate::domain::catalog::{CatalogError, Course, Lesson};
use crate::domain::foundation::CourseId;
use crate::domain::user::Principal;
use crate::ports::CatalogReader;

/// Query for one course as seen by `principal`.
#[derive(Debug, Clone)]
pub struct GetCourseQuery {
    pub principal: Principal,
    pub course_id: CourseId,
}

/// Course detail with the principal's permissions on it.
#[derive(Debug, Clone)]
pub struct CourseDetail {
    pub course: Course,
    /// Lessons ordered by position.
    pub lessons: Vec<Lesson>,
    pub has_access_to_lessons: bool,
    pub can_edit: bool,
}

/// Handler for course detail. Anyone may see the course itself; the
/// flags tell the caller whether its lessons can be opened.
pub struct GetCourseHandler {
    catalog: Arc<dyn CatalogReader>,
}

impl GetCourseHandler {
    pub fn new(catalog: Arc<dyn CatalogReader>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, query: GetCourseQuery) -> Result<CourseDetail, CatalogError> {
        let course = self
            .catalog
            .find_course(&query.course_id)
            .await?
            .ok_or_else(|| CatalogError::course_not_found(query.course_id))?;

        let lessons = self.catalog.list_lessons(&course.id).await?;

        let has_access_to_lessons = can_view_course(&query.principal, &course).is_granted();
        let can_edit = can_edit(&query.principal, EditTarget::Course(&course)).is_granted();

        Ok(CourseDetail {
            course,
            lessons,
            has_access_to_lessons,
            can_edit,
        })
    }
}
