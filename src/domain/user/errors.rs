//! Account error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | AccessDenied(NotAuthenticated) | 401 |
//! | AccessDenied(other) | 403 |
//! | InvalidCredentials | 401 |
//! | ValidationFailed | 400 |
//! | Conflict | 409 |
//! | Infrastructure | 500 |

use std::fmt;

use crate::domain::access::DenialReason;
use crate::domain::foundation::{DomainError, ErrorCode, UserId, ValidationError};

/// Errors raised by registration, profile edits and login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserError {
    NotFound(UserId),

    AccessDenied(DenialReason),

    /// Unknown phone number or wrong password. Deliberately indistinguishable.
    InvalidCredentials,

    ValidationFailed { field: String, message: String },

    /// Username, email or phone number already belongs to another account.
    Conflict { field: Option<String> },

    Infrastructure(String),
}

impl UserError {
    pub fn not_found(id: UserId) -> Self {
        UserError::NotFound(id)
    }

    pub fn access_denied(reason: DenialReason) -> Self {
        UserError::AccessDenied(reason)
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        UserError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        UserError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            UserError::NotFound(_) => ErrorCode::UserNotFound,
            UserError::AccessDenied(DenialReason::NotAuthenticated)
            | UserError::InvalidCredentials => ErrorCode::Unauthorized,
            UserError::AccessDenied(_) => ErrorCode::Forbidden,
            UserError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            UserError::Conflict { .. } => ErrorCode::Conflict,
            UserError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            UserError::NotFound(id) => format!("User not found: {}", id),
            UserError::AccessDenied(DenialReason::NotAuthenticated) => {
                "Authentication is required".to_string()
            }
            UserError::AccessDenied(_) => "You can only edit your own account".to_string(),
            UserError::InvalidCredentials => "Invalid phone number or password".to_string(),
            UserError::ValidationFailed { field, message } => {
                format!("Validation failed for {}: {}", field, message)
            }
            UserError::Conflict { field: Some(field) } => format!("{} is already taken", field),
            UserError::Conflict { field: None } => "Account details are already taken".to_string(),
            UserError::Infrastructure(_) => "An internal error occurred".to_string(),
        }
    }
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserError::Infrastructure(detail) => write!(f, "infrastructure error: {}", detail),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for UserError {}

impl From<DomainError> for UserError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Conflict => UserError::Conflict {
                field: err.details.get("field").cloned(),
            },
            ErrorCode::ValidationFailed => UserError::validation(
                err.details.get("field").cloned().unwrap_or_default(),
                err.message,
            ),
            _ => UserError::infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for UserError {
    fn from(err: ValidationError) -> Self {
        UserError::validation(err.field().to_string(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_credentials_and_anonymous_are_unauthorized() {
        assert_eq!(UserError::InvalidCredentials.code(), ErrorCode::Unauthorized);
        assert_eq!(
            UserError::access_denied(DenialReason::NotAuthenticated).code(),
            ErrorCode::Unauthorized
        );
        assert_eq!(
            UserError::access_denied(DenialReason::InsufficientPrivilege).code(),
            ErrorCode::Forbidden
        );
    }

    #[test]
    fn storage_conflict_names_the_field() {
        let err: UserError = DomainError::new(ErrorCode::Conflict, "duplicate")
            .with_detail("field", "email")
            .into();
        assert_eq!(err, UserError::Conflict { field: Some("email".to_string()) });
        assert_eq!(err.message(), "email is already taken");
    }

    #[test]
    fn infrastructure_message_hides_detail() {
        let err: UserError = DomainError::database("connection reset").into();
        assert_eq!(err.message(), "An internal error occurred");
        assert!(err.to_string().contains("connection reset"));
    }
}
