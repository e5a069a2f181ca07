//! CreateCourseHandler - Command handler for authoring a new course.
//!
//! Any signed-in user may create a course and becomes its owner.

use std::sync::Arc;

use tracing::info;

use crate::domain::access::DenialReason;
use crate::domain::catalog::{CatalogError, Course, CourseCategory, CoursePricing};
use crate::domain::user::Principal;
use crate::ports::CatalogRepository;

#[derive(Debug, Clone)]
pub struct CreateCourseCommand {
    pub principal: Principal,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<CourseCategory>,
    pub video_url: Option<String>,
    pub pricing: CoursePricing,
}

pub struct CreateCourseHandler {
    courses: Arc<dyn CatalogRepository>,
}

impl CreateCourseHandler {
    pub fn new(courses: Arc<dyn CatalogRepository>) -> Self {
        Self { courses }
    }

    pub async fn handle(&self, cmd: CreateCourseCommand) -> Result<Course, CatalogError> {
        let owner = *cmd
            .principal
            .user_id()
            .ok_or(CatalogError::access_denied(DenialReason::NotAuthenticated))?;

        let mut course = Course::new(cmd.name, Some(owner), cmd.pricing)?;
        course.description = cmd.description;
        course.category = cmd.category;
        course.video_url = cmd.video_url;

        self.courses.save_course(&course).await?;

        info!(course_id = %course.id, owner_id = %owner, "course created");
        Ok(course)
    }
}
