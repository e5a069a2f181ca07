//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, the state machine trait, ownership
//! and the error vocabulary shared by the catalog and payment modules.

mod auth;
mod errors;
mod ids;
mod ownership;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CourseId, LessonId, PaymentId, UserId};
pub use ownership::Owned;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
