//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;

pub use handlers::catalog::{
    CourseDetail, CreateCourseCommand, CreateCourseHandler, CreateLessonCommand,
    CreateLessonHandler, DeleteCourseCommand, DeleteCourseHandler, DeleteLessonCommand,
    DeleteLessonHandler, GetCourseHandler, GetCourseQuery, GetLessonHandler, GetLessonQuery,
    LessonDetail, ListCoursesHandler, ListCoursesQuery, StartCourseCommand, StartCourseHandler,
    StartCourseResult, UpdateCourseCommand, UpdateCourseHandler, UpdateLessonCommand,
    UpdateLessonHandler,
};
pub use handlers::payment::{
    BeginPurchaseCommand, BeginPurchaseHandler, BeginPurchaseResult, CheckoutCancelResult,
    CheckoutReturnResult, CheckoutUrls, ConfirmPaymentCommand, ConfirmPaymentHandler,
    HandleCheckoutCancelCommand, HandleCheckoutCancelHandler, HandleCheckoutReturnCommand,
    HandleCheckoutReturnHandler, HandlePaymentWebhookCommand, HandlePaymentWebhookHandler,
    HandlePaymentWebhookResult, ListPaymentsHandler, ListPaymentsQuery, ReconcileResult,
};
pub use handlers::user::{
    LoginCommand, LoginHandler, RegisterUserCommand, RegisterUserHandler, UpdateUserCommand,
    UpdateUserHandler,
};
pub use handlers::PrincipalResolver;
