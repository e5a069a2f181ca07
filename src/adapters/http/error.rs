//! Error responses for the HTTP surface.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | AccessDenied(NotAuthenticated) | 401 |
//! | AccessDenied(other) | 403 |
//! | InvalidPurchaseRequest / ValidationFailed | 400 |
//! | SignatureInvalid | 400 |
//! | InvalidCredentials | 401 |
//! | CourseNotFound / LessonNotFound / NotFound | 404 |
//! | Conflict (catalog, account) | 409 |
//! | Gateway | 502 |
//! | ReconciliationConflict / Infrastructure | 500 |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::access::DenialReason;
use crate::domain::catalog::CatalogError;
use crate::domain::foundation::DomainError;
use crate::domain::payment::PaymentError;
use crate::domain::user::UserError;

/// Standard error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// API error type that converts domain errors to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    Catalog(CatalogError),
    Payment(PaymentError),
    User(UserError),
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        Self::Payment(err)
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        Self::User(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Catalog(CatalogError::infrastructure(err.to_string()))
    }
}

fn denial_status(reason: &DenialReason) -> StatusCode {
    match reason {
        DenialReason::NotAuthenticated => StatusCode::UNAUTHORIZED,
        DenialReason::NotPurchased | DenialReason::InsufficientPrivilege => StatusCode::FORBIDDEN,
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Catalog(err) => match err {
                CatalogError::CourseNotFound(_) | CatalogError::LessonNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                CatalogError::AccessDenied(reason) => denial_status(reason),
                CatalogError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
                CatalogError::Conflict(_) => StatusCode::CONFLICT,
                CatalogError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Payment(err) => match err {
                PaymentError::AccessDenied(reason) => denial_status(reason),
                PaymentError::InvalidPurchaseRequest { .. }
                | PaymentError::ValidationFailed { .. }
                | PaymentError::SignatureInvalid => StatusCode::BAD_REQUEST,
                PaymentError::NotFound(_) | PaymentError::CourseNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                PaymentError::Gateway { .. } => StatusCode::BAD_GATEWAY,
                PaymentError::ReconciliationConflict { .. } | PaymentError::Infrastructure(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::User(err) => match err {
                UserError::NotFound(_) => StatusCode::NOT_FOUND,
                UserError::AccessDenied(reason) => denial_status(reason),
                UserError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                UserError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
                UserError::Conflict { .. } => StatusCode::CONFLICT,
                UserError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            ApiError::Catalog(err) => ErrorResponse::new(err.code().to_string(), err.message()),
            ApiError::Payment(err) => ErrorResponse::new(err.code().to_string(), err.message()),
            ApiError::User(err) => ErrorResponse::new(err.code().to_string(), err.message()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                ApiError::Catalog(err) => tracing::error!(error = %err, "request failed"),
                ApiError::Payment(err) => tracing::error!(error = %err, "request failed"),
                ApiError::User(err) => tracing::error!(error = %err, "request failed"),
            }
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CourseId, PaymentId};
    use crate::domain::payment::GatewayStep;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn denials_split_between_401_and_403() {
        assert_eq!(
            status_of(CatalogError::access_denied(DenialReason::NotAuthenticated)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(CatalogError::access_denied(DenialReason::NotPurchased)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(PaymentError::access_denied(DenialReason::InsufficientPrivilege)),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn purchase_errors_map_to_client_and_gateway_statuses() {
        assert_eq!(
            status_of(PaymentError::invalid_request("free")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(PaymentError::SignatureInvalid), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(PaymentError::gateway(GatewayStep::CreatePrice, "down", true)),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(PaymentError::course_not_found(CourseId::new())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn conflict_and_infrastructure_are_500() {
        assert_eq!(
            status_of(PaymentError::conflict(PaymentId::new(), "paid after failed")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(DomainError::database("pool closed")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn conflicts_and_bad_credentials_map_to_409_and_401() {
        assert_eq!(
            status_of(CatalogError::conflict("Course has payments")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(UserError::Conflict { field: Some("email".into()) }),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(UserError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(UserError::access_denied(DenialReason::InsufficientPrivilege)),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn body_uses_error_code_and_user_message() {
        let body = ApiError::from(PaymentError::SignatureInvalid).body();
        assert_eq!(body.code, "INVALID_SIGNATURE");
        assert_eq!(body.message, "Invalid webhook signature");

        let body =
            ApiError::from(PaymentError::gateway(GatewayStep::CreateProduct, "secret", false))
                .body();
        assert!(!body.message.contains("secret"));
    }
}
