//! Shared application state for the HTTP handlers.

use std::sync::Arc;

use crate::application::handlers::catalog::{
    CreateCourseHandler, CreateLessonHandler, DeleteCourseHandler, DeleteLessonHandler,
    GetCourseHandler, GetLessonHandler, ListCoursesHandler, StartCourseHandler,
    UpdateCourseHandler, UpdateLessonHandler,
};
use crate::application::handlers::payment::{
    BeginPurchaseHandler, CheckoutUrls, HandleCheckoutCancelHandler, HandleCheckoutReturnHandler,
    HandlePaymentWebhookHandler, ListPaymentsHandler,
};
use crate::application::handlers::user::{LoginHandler, RegisterUserHandler, UpdateUserHandler};
use crate::application::handlers::PrincipalResolver;
use crate::domain::foundation::AuthenticatedUser;
use crate::domain::user::Principal;
use crate::ports::{
    CatalogReader, CatalogRepository, PasswordHasher, PaymentGateway, PaymentRepository,
    TokenIssuer, UserRepository,
};

use super::error::ApiError;

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped dependencies
/// for efficient sharing across handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogReader>,
    pub catalog_admin: Arc<dyn CatalogRepository>,
    pub users: Arc<dyn UserRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub token_issuer: Arc<dyn TokenIssuer>,
    pub checkout_urls: CheckoutUrls,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        catalog_admin: Arc<dyn CatalogRepository>,
        users: Arc<dyn UserRepository>,
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        password_hasher: Arc<dyn PasswordHasher>,
        token_issuer: Arc<dyn TokenIssuer>,
        checkout_urls: CheckoutUrls,
    ) -> Self {
        Self {
            catalog,
            catalog_admin,
            users,
            payments,
            gateway,
            password_hasher,
            token_issuer,
            checkout_urls,
        }
    }

    /// Loads the account behind a validated token.
    pub async fn principal(&self, session: Option<&AuthenticatedUser>) -> Result<Principal, ApiError> {
        Ok(PrincipalResolver::new(self.users.clone())
            .resolve(session)
            .await?)
    }

    // Create handlers on demand from the shared state.

    pub fn list_courses_handler(&self) -> ListCoursesHandler {
        ListCoursesHandler::new(self.catalog.clone())
    }

    pub fn get_course_handler(&self) -> GetCourseHandler {
        GetCourseHandler::new(self.catalog.clone())
    }

    pub fn get_lesson_handler(&self) -> GetLessonHandler {
        GetLessonHandler::new(self.catalog.clone())
    }

    pub fn start_course_handler(&self) -> StartCourseHandler {
        StartCourseHandler::new(self.catalog.clone(), self.users.clone())
    }

    pub fn create_course_handler(&self) -> CreateCourseHandler {
        CreateCourseHandler::new(self.catalog_admin.clone())
    }

    pub fn update_course_handler(&self) -> UpdateCourseHandler {
        UpdateCourseHandler::new(self.catalog.clone(), self.catalog_admin.clone())
    }

    pub fn delete_course_handler(&self) -> DeleteCourseHandler {
        DeleteCourseHandler::new(self.catalog.clone(), self.catalog_admin.clone())
    }

    pub fn create_lesson_handler(&self) -> CreateLessonHandler {
        CreateLessonHandler::new(self.catalog.clone(), self.catalog_admin.clone())
    }

    pub fn update_lesson_handler(&self) -> UpdateLessonHandler {
        UpdateLessonHandler::new(self.catalog.clone(), self.catalog_admin.clone())
    }

    pub fn delete_lesson_handler(&self) -> DeleteLessonHandler {
        DeleteLessonHandler::new(self.catalog.clone(), self.catalog_admin.clone())
    }

    pub fn register_user_handler(&self) -> RegisterUserHandler {
        RegisterUserHandler::new(self.users.clone(), self.password_hasher.clone())
    }

    pub fn update_user_handler(&self) -> UpdateUserHandler {
        UpdateUserHandler::new(self.users.clone(), self.password_hasher.clone())
    }

    pub fn login_handler(&self) -> LoginHandler {
        LoginHandler::new(
            self.users.clone(),
            self.password_hasher.clone(),
            self.token_issuer.clone(),
        )
    }

    pub fn begin_purchase_handler(&self) -> BeginPurchaseHandler {
        BeginPurchaseHandler::new(
            self.catalog.clone(),
            self.payments.clone(),
            self.gateway.clone(),
            self.checkout_urls.clone(),
        )
    }

    pub fn list_payments_handler(&self) -> ListPaymentsHandler {
        ListPaymentsHandler::new(self.payments.clone())
    }

    pub fn checkout_return_handler(&self) -> HandleCheckoutReturnHandler {
        HandleCheckoutReturnHandler::new(self.payments.clone(), self.gateway.clone())
    }

    pub fn checkout_cancel_handler(&self) -> HandleCheckoutCancelHandler {
        HandleCheckoutCancelHandler::new(self.payments.clone())
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(self.payments.clone(), self.gateway.clone())
    }
}
