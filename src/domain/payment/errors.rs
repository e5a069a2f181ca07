//! Payment-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | AccessDenied(NotAuthenticated) | 401 |
//! | AccessDenied(other) | 403 |
//! | InvalidPurchaseRequest | 400 |
//! | ValidationFailed | 400 |
//! | SignatureInvalid | 400 |
//! | NotFound / CourseNotFound | 404 |
//! | Gateway | 502 |
//! | ReconciliationConflict | 500 |
//! | Infrastructure | 500 |

use std::fmt;

use crate::domain::access::DenialReason;
use crate::domain::foundation::{CourseId, DomainError, ErrorCode, PaymentId, ValidationError};

/// Processor call that failed while starting a purchase or reconciling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayStep {
    CreateProduct,
    CreatePrice,
    CreateCheckoutSession,
    RetrieveSession,
}

impl GatewayStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayStep::CreateProduct => "create_product",
            GatewayStep::CreatePrice => "create_price",
            GatewayStep::CreateCheckoutSession => "create_checkout_session",
            GatewayStep::RetrieveSession => "retrieve_session",
        }
    }
}

impl fmt::Display for GatewayStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the purchase and reconciliation flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// The access evaluator or ownership check refused the request.
    AccessDenied(DenialReason),

    /// Free course, already bought, or the payment is not in a confirmable stage.
    InvalidPurchaseRequest { reason: String },

    /// The processor call failed or timed out.
    Gateway {
        step: GatewayStep,
        cause: String,
        retryable: bool,
    },

    /// Webhook payload failed authenticity checks.
    SignatureInvalid,

    /// Processor and local record disagree in a way that cannot be resolved automatically.
    ReconciliationConflict { payment_id: PaymentId, detail: String },

    NotFound(PaymentId),

    CourseNotFound(CourseId),

    ValidationFailed { field: String, message: String },

    Infrastructure(String),
}

impl PaymentError {
    pub fn access_denied(reason: DenialReason) -> Self {
        PaymentError::AccessDenied(reason)
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        PaymentError::InvalidPurchaseRequest {
            reason: reason.into(),
        }
    }

    pub fn gateway(step: GatewayStep, cause: impl Into<String>, retryable: bool) -> Self {
        PaymentError::Gateway {
            step,
            cause: cause.into(),
            retryable,
        }
    }

    pub fn conflict(payment_id: PaymentId, detail: impl Into<String>) -> Self {
        PaymentError::ReconciliationConflict {
            payment_id,
            detail: detail.into(),
        }
    }

    pub fn not_found(id: PaymentId) -> Self {
        PaymentError::NotFound(id)
    }

    pub fn course_not_found(id: CourseId) -> Self {
        PaymentError::CourseNotFound(id)
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PaymentError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        PaymentError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PaymentError::AccessDenied(DenialReason::NotAuthenticated) => ErrorCode::Unauthorized,
            PaymentError::AccessDenied(_) => ErrorCode::Forbidden,
            PaymentError::InvalidPurchaseRequest { .. } => ErrorCode::InvalidStateTransition,
            PaymentError::Gateway { .. } => ErrorCode::GatewayError,
            PaymentError::SignatureInvalid => ErrorCode::InvalidSignature,
            PaymentError::ReconciliationConflict { .. } => ErrorCode::ReconciliationConflict,
            PaymentError::NotFound(_) => ErrorCode::PaymentNotFound,
            PaymentError::CourseNotFound(_) => ErrorCode::CourseNotFound,
            PaymentError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            PaymentError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// Returns a user-facing message. Processor and storage details stay in logs.
    pub fn message(&self) -> String {
        match self {
            PaymentError::AccessDenied(reason) => reason.user_message().to_string(),
            PaymentError::InvalidPurchaseRequest { reason } => reason.clone(),
            PaymentError::Gateway {
                step: GatewayStep::RetrieveSession,
                ..
            } => "Payment status could not be verified, try again".to_string(),
            PaymentError::Gateway { .. } => "Payment could not be started, try again".to_string(),
            PaymentError::SignatureInvalid => "Invalid webhook signature".to_string(),
            PaymentError::ReconciliationConflict { .. } => {
                "Payment state needs manual review".to_string()
            }
            PaymentError::NotFound(id) => format!("Payment not found: {}", id),
            PaymentError::CourseNotFound(id) => format!("Course not found: {}", id),
            PaymentError::ValidationFailed { field, message } => {
                format!("Validation failed for {}: {}", field, message)
            }
            PaymentError::Infrastructure(_) => "An internal error occurred".to_string(),
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            PaymentError::Gateway { retryable, .. } => *retryable,
            PaymentError::Infrastructure(_) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentError::Gateway { step, cause, .. } => {
                write!(f, "gateway error during {}: {}", step, cause)
            }
            PaymentError::ReconciliationConflict { payment_id, detail } => {
                write!(f, "reconciliation conflict on payment {}: {}", payment_id, detail)
            }
            PaymentError::Infrastructure(detail) => write!(f, "infrastructure error: {}", detail),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for PaymentError {}

impl From<DomainError> for PaymentError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => PaymentError::validation(
                err.details.get("field").cloned().unwrap_or_default(),
                err.message,
            ),
            ErrorCode::InvalidStateTransition => PaymentError::invalid_request(err.message),
            _ => PaymentError::infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for PaymentError {
    fn from(err: ValidationError) -> Self {
        DomainError::from(err).into()
    }
}
