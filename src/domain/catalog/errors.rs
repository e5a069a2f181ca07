//! Catalog-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | CourseNotFound | 404 |
//! | LessonNotFound | 404 |
//! | AccessDenied(NotAuthenticated) | 401 |
//! | AccessDenied(other) | 403 |
//! | ValidationFailed | 400 |
//! | Conflict | 409 |
//! | Infrastructure | 500 |

use std::fmt;

use crate::domain::access::DenialReason;
use crate::domain::foundation::{CourseId, DomainError, ErrorCode, LessonId, ValidationError};

/// Errors raised while reading, editing or enrolling in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    CourseNotFound(CourseId),

    LessonNotFound(LessonId),

    /// The access evaluator refused the request.
    AccessDenied(DenialReason),

    ValidationFailed { field: String, message: String },

    /// The change clashes with stored data, e.g. deleting a course that
    /// has payments.
    Conflict(String),

    Infrastructure(String),
}

impl CatalogError {
    pub fn course_not_found(id: CourseId) -> Self {
        CatalogError::CourseNotFound(id)
    }

    pub fn lesson_not_found(id: LessonId) -> Self {
        CatalogError::LessonNotFound(id)
    }

    pub fn access_denied(reason: DenialReason) -> Self {
        CatalogError::AccessDenied(reason)
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CatalogError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CatalogError::Conflict(message.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        CatalogError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CatalogError::CourseNotFound(_) => ErrorCode::CourseNotFound,
            CatalogError::LessonNotFound(_) => ErrorCode::LessonNotFound,
            CatalogError::AccessDenied(DenialReason::NotAuthenticated) => ErrorCode::Unauthorized,
            CatalogError::AccessDenied(_) => ErrorCode::Forbidden,
            CatalogError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            CatalogError::Conflict(_) => ErrorCode::Conflict,
            CatalogError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// Returns a user-facing message.
    pub fn message(&self) -> String {
        match self {
            CatalogError::CourseNotFound(id) => format!("Course not found: {}", id),
            CatalogError::LessonNotFound(id) => format!("Lesson not found: {}", id),
            CatalogError::AccessDenied(reason) => reason.user_message().to_string(),
            CatalogError::ValidationFailed { field, message } => {
                format!("Validation failed for {}: {}", field, message)
            }
            CatalogError::Conflict(message) => message.clone(),
            CatalogError::Infrastructure(_) => "An internal error occurred".to_string(),
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Infrastructure(detail) => write!(f, "infrastructure error: {}", detail),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<DomainError> for CatalogError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => CatalogError::validation(
                err.details.get("field").cloned().unwrap_or_default(),
                err.message,
            ),
            ErrorCode::Conflict => CatalogError::conflict(err.message),
            _ => CatalogError::infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for CatalogError {
    fn from(err: ValidationError) -> Self {
        CatalogError::validation(err.field().to_string(), err.to_string())
    }
}
