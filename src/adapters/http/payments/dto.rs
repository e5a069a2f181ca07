//! Data Transfer Objects for payment endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::handlers::payment::{
    BeginPurchaseResult, CheckoutCancelResult, CheckoutReturnResult, HandlePaymentWebhookResult,
};
use crate::domain::foundation::{CourseId, PaymentId, Timestamp, UserId};
use crate::domain::payment::{Payment, PaymentMethod, PaymentStatus};
use crate::ports::PaymentOrder;

use super::super::error::ApiError;
use crate::domain::payment::PaymentError;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Optional body of `POST /api/courses/:course_id/purchase`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseRequest {
    #[serde(default)]
    pub method: Option<PaymentMethod>,
}

/// Query string of `GET /api/payments`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPaymentsParams {
    pub course_id: Option<CourseId>,
    pub method: Option<PaymentMethod>,
    /// `created_at` or `-created_at`.
    pub ordering: Option<String>,
}

impl ListPaymentsParams {
    pub fn order(&self) -> Result<PaymentOrder, ApiError> {
        match self.ordering.as_deref() {
            None => Ok(PaymentOrder::default()),
            Some(raw) => PaymentOrder::parse(raw).ok_or_else(|| {
                PaymentError::validation(
                    "ordering",
                    format!("unsupported ordering '{}'", raw),
                )
                .into()
            }),
        }
    }
}

/// Query string the processor appends to the success redirect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutReturnParams {
    pub session_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseResponse {
    pub payment_id: PaymentId,
    /// Hosted checkout page to send the buyer to.
    pub redirect_url: String,
}

impl From<BeginPurchaseResult> for PurchaseResponse {
    fn from(result: BeginPurchaseResult) -> Self {
        Self {
            payment_id: result.payment_id,
            redirect_url: result.redirect_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: PaymentId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub session_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id,
            user_id: payment.user_id,
            course_id: payment.course_id(),
            amount: payment.amount.amount(),
            method: payment.method,
            status: payment.status,
            session_id: payment.session_id().map(str::to_string),
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutReturnResponse {
    pub payment_id: PaymentId,
    pub course_id: CourseId,
    pub status: PaymentStatus,
    /// What this request did, e.g. `succeeded` or `already_succeeded`.
    pub outcome: String,
}

impl From<CheckoutReturnResult> for CheckoutReturnResponse {
    fn from(result: CheckoutReturnResult) -> Self {
        Self {
            payment_id: result.payment_id,
            course_id: result.course_id,
            status: result.outcome.status(),
            outcome: result.outcome.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutCancelResponse {
    pub payment_id: PaymentId,
    pub course_id: CourseId,
    pub status: PaymentStatus,
}

impl From<CheckoutCancelResult> for CheckoutCancelResponse {
    fn from(result: CheckoutCancelResult) -> Self {
        Self {
            payment_id: result.payment_id,
            course_id: result.course_id,
            status: result.status,
        }
    }
}

/// Acknowledgement returned to the processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<PaymentId>,
}

impl From<HandlePaymentWebhookResult> for WebhookAck {
    fn from(result: HandlePaymentWebhookResult) -> Self {
        match result {
            HandlePaymentWebhookResult::Reconciled {
                payment_id,
                outcome,
            } => Self {
                received: true,
                outcome: outcome.as_str().to_string(),
                payment_id: Some(payment_id),
            },
            HandlePaymentWebhookResult::Unmatched { .. } => Self {
                received: true,
                outcome: "unmatched".to_string(),
                payment_id: None,
            },
            HandlePaymentWebhookResult::Ignored { .. } => Self {
                received: true,
                outcome: "ignored".to_string(),
                payment_id: None,
            },
        }
    }
}
