//! UpdateLessonHandler - Command handler for editing a lesson.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::access::{can_edit, EditTarget};
use crate::domain::catalog::{CatalogError, Lesson, LessonChanges};
use crate::domain::foundation::{CourseId, LessonId};
use crate::domain::user::Principal;
use crate::ports::{CatalogReader, CatalogRepository};

#[derive(Debug, Clone)]
pub struct UpdateLessonCommand {
    pub principal: Principal,
    pub course_id: CourseId,
    pub lesson_id: LessonId,
    pub changes: LessonChanges,
}

pub struct UpdateLessonHandler {
    catalog: Arc<dyn CatalogReader>,
    lessons: Arc<dyn CatalogRepository>,
}

impl UpdateLessonHandler {
    pub fn new(catalog: Arc<dyn CatalogReader>, lessons: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog, lessons }
    }

    pub async fn handle(&self, cmd: UpdateLessonCommand) -> Result<Lesson, CatalogError> {
        let course = self
            .catalog
            .find_course(&cmd.course_id)
            .await?
            .ok_or_else(|| CatalogError::course_not_found(cmd.course_id))?;

        let mut lesson = self
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
            debug!(lesson_id = %lesson.id, reason = reason.code(), "lesson edit denied");
            CatalogError::access_denied(reason)
        })?;

        if cmd.changes.is_empty() {
            return Ok(lesson);
        }

        lesson.apply(cmd.changes)?;
        self.lessons.update_lesson(&lesson).await?;

        info!(lesson_id = %lesson.id, "lesson updated");
        Ok(lesson)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::application::handlers::catalog::fixtures::{
        free_course, lesson_of, member, paid_course,
    };
    use crate::domain::access::DenialReason;
    use crate::domain::catalog::Course;
    use crate::domain::user::User;

    async fn setup(course: &Course, lesson: &Lesson) -> (UpdateLessonHandler, InMemoryStore) {
        let store = InMemoryStore::new();
        store.insert_course(course.clone()).await;
        store.insert_lesson(lesson.clone()).await;
        let handler = UpdateLessonHandler::new(Arc::new(store.clone()), Arc::new(store.clone()));
        (handler, store)
    }

    fn move_to_end(principal: Principal, course: &Course, lesson: &Lesson) -> UpdateLessonCommand {
        UpdateLessonCommand {
            principal,
            course_id: course.id,
            lesson_id: lesson.id,
            changes: LessonChanges {
                position: Some(9),
                ..LessonChanges::default()
            },
        }
    }

    #[tokio::test]
    async fn lesson_owner_edits_without_owning_course() {
        let author = member();
        let course = paid_course(None);
        let lesson = Lesson::new(course.id, "Borrowing", Some(author.id)).unwrap();
        let (handler, store) = setup(&course, &lesson).await;

        let updated = handler
            .handle(move_to_end(Principal::Authenticated(author), &course, &lesson))
            .await
            .unwrap();

        assert_eq!(updated.position, 9);
        let stored = store.find_lesson(&lesson.id).await.unwrap().unwrap();
        assert_eq!(stored.position, 9);
    }

    #[tokio::test]
    async fn non_owner_gets_insufficient_privilege() {
        let course = paid_course(Some(member().id));
        let lesson = lesson_of(&course, 0);
        let (handler, _) = setup(&course, &lesson).await;
        let stranger = User::new("stranger", "stranger@example.com", "+15550008888").unwrap();

        let result = handler
            .handle(move_to_end(Principal::Authenticated(stranger), &course, &lesson))
            .await;

        assert_eq!(
            result.unwrap_err(),
            CatalogError::AccessDenied(DenialReason::InsufficientPrivilege)
        );
    }

    #[tokio::test]
    async fn lesson_of_another_course_is_not_found() {
        let author = member();
        let course = paid_course(Some(author.id));
        let other = free_course(Some(author.id));
        let lesson = lesson_of(&other, 0);
        let (handler, store) = setup(&course, &lesson).await;
        store.insert_course(other).await;

        let result = handler
            .handle(move_to_end(Principal::Authenticated(author), &course, &lesson))
            .await;

        assert_eq!(result.unwrap_err(), CatalogError::LessonNotFound(lesson.id));
    }
}
