//! StartCourseHandler - Command handler for marking a course as started.
//!
//! Starting is a bookmark only. It never touches the bought set and the
//! access evaluator never consults it.

use std::sync::Arc;

use tracing::info;

use crate::domain::access::DenialReason;
use crate::domain::catalog::CatalogError;
use crate::domain::foundation::CourseId;
use crate::domain::user::Principal;
use crate::ports::{CatalogReader, UserRepository};

#[derive(Debug, Clone)]
pub struct StartCourseCommand {
    pub principal: Principal,
    pub course_id: CourseId,
}

/// Result of starting a course. Repeating the command is harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartCourseResult {
    Started,
    AlreadyStarted,
}

impl StartCourseResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            StartCourseResult::Started => "started",
            StartCourseResult::AlreadyStarted => "already_started",
        }
    }
}

pub struct StartCourseHandler {
    catalog: Arc<dyn CatalogReader>,
    users: Arc<dyn UserRepository>,
}

impl StartCourseHandler {
    pub fn new(catalog: Arc<dyn CatalogReader>, users: Arc<dyn UserRepository>) -> Self {
        Self { catalog, users }
    }

    pub async fn handle(&self, cmd: StartCourseCommand) -> Result<StartCourseResult, CatalogError> {
        let user_id = *cmd
            .principal
            .user_id()
            .ok_or(CatalogError::access_denied(DenialReason::NotAuthenticated))?;

        let course = self
            .catalog
            .find_course(&cmd.course_id)
            .await?
            .ok_or_else(|| CatalogError::course_not_found(cmd.course_id))?;

        if self.users.add_started_course(&user_id, &course.id).await? {
            info!(user_id = %user_id, course_id = %course.id, "course started");
            Ok(StartCourseResult::Started)
        } else {
            Ok(StartCourseResult::AlreadyStarted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::application::handlers::catalog::fixtures::{member, paid_course};

    #[tokio::test]
    async fn start_is_idempotent_and_grants_nothing() {
        let store = InMemoryStore::new();
        let course = paid_course(None);
        let user = member();
        store.insert_course(course.clone()).await;
        store.insert_user(user.clone()).await;
        let handler = StartCourseHandler::new(Arc::new(store.clone()), Arc::new(store.clone()));

        let cmd = StartCourseCommand {
            principal: Principal::Authenticated(user.clone()),
            course_id: course.id,
        };
        assert_eq!(handler.handle(cmd.clone()).await.unwrap(), StartCourseResult::Started);
        assert_eq!(
            handler.handle(cmd).await.unwrap(),
            StartCourseResult::AlreadyStarted
        );

        let stored = UserRepository::find_by_id(&store, &user.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.has_started(&course.id));
        assert!(!stored.has_bought(&course.id));
    }

    #[tokio::test]
    async fn anonymous_cannot_start() {
        let store = InMemoryStore::new();
        let course = paid_course(None);
        store.insert_course(course.clone()).await;
        let handler = StartCourseHandler::new(Arc::new(store.clone()), Arc::new(store));

        let result = handler
            .handle(StartCourseCommand {
                principal: Principal::Anonymous,
                course_id: course.id,
            })
            .await;

        assert_eq!(
            result.unwrap_err(),
            CatalogError::AccessDenied(DenialReason::NotAuthenticated)
        );
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let store = InMemoryStore::new();
        let user = member();
        store.insert_user(user.clone()).await;
        let handler = StartCourseHandler::new(Arc::new(store.clone()), Arc::new(store));
        let id = CourseId::new();

        let result = handler
            .handle(StartCourseCommand {
                principal: Principal::Authenticated(user),
                course_id: id,
            })
            .await;

        assert_eq!(result.unwrap_err(), CatalogError::CourseNotFound(id));
    }
}
