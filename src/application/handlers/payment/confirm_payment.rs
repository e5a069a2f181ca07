//! ConfirmPaymentHandler - the reconciliation core.
//!
//! Both the browser return and the processor webhook end here once they
//! hold a trustworthy external status. The repository performs the status
//! change and the course grant as one compare-and-set, so duplicate or
//! concurrent confirmations settle a payment exactly once and every losing
//! caller gets the idempotent no-op.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId};
use crate::domain::payment::{ExternalPaymentStatus, PaymentError, PaymentStatus};
use crate::ports::{PaymentRepository, TransitionOutcome};

#[derive(Debug, Clone)]
pub struct ConfirmPaymentCommand {
    pub payment_id: PaymentId,
    pub external_status: ExternalPaymentStatus,
}

/// What a confirmation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileResult {
    /// This call settled the payment and granted the course.
    Succeeded,
    /// Someone else settled it first; nothing changed.
    AlreadySucceeded,
    /// This call recorded a definitive failure.
    MarkedFailed,
    AlreadyFailed,
    /// Not paid yet; the payment stays pending.
    StillPending,
}

impl ReconcileResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileResult::Succeeded => "succeeded",
            ReconcileResult::AlreadySucceeded => "already_succeeded",
            ReconcileResult::MarkedFailed => "marked_failed",
            ReconcileResult::AlreadyFailed => "already_failed",
            ReconcileResult::StillPending => "still_pending",
        }
    }

    /// Payment status after the confirmation.
    pub fn status(&self) -> PaymentStatus {
        match self {
            ReconcileResult::Succeeded | ReconcileResult::AlreadySucceeded => {
                PaymentStatus::Succeeded
            }
            ReconcileResult::MarkedFailed | ReconcileResult::AlreadyFailed => PaymentStatus::Failed,
            ReconcileResult::StillPending => PaymentStatus::Pending,
        }
    }
}

#[derive(Clone)]
pub struct ConfirmPaymentHandler {
    payments: Arc<dyn PaymentRepository>,
}

impl ConfirmPaymentHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>) -> Self {
        Self { payments }
    }

    pub async fn handle(&self, cmd: ConfirmPaymentCommand) -> Result<ReconcileResult, PaymentError> {
        let id = cmd.payment_id;

        match cmd.external_status.settles_to() {
            Some(PaymentStatus::Succeeded) => {
                let outcome = self
                    .payments
                    .complete_and_grant(&id)
                    .await
                    .map_err(|e| repository_error(&id, e))?;

                match outcome {
                    TransitionOutcome::Applied => {
                        info!(payment_id = %id, "payment succeeded, course granted");
                        Ok(ReconcileResult::Succeeded)
                    }
                    TransitionOutcome::AlreadySucceeded => {
                        debug!(payment_id = %id, "payment already succeeded");
                        Ok(ReconcileResult::AlreadySucceeded)
                    }
                    TransitionOutcome::AlreadyFailed => {
                        error!(
                            payment_id = %id,
                            "processor reports paid for a payment recorded as failed"
                        );
                        Err(PaymentError::conflict(
                            id,
                            "paid confirmation for a failed payment",
                        ))
                    }
                }
            }
            Some(PaymentStatus::Failed) => {
                let outcome = self
                    .payments
                    .mark_failed(&id)
                    .await
                    .map_err(|e| repository_error(&id, e))?;

                Ok(match outcome {
                    TransitionOutcome::Applied => {
                        info!(payment_id = %id, "payment failed");
                        ReconcileResult::MarkedFailed
                    }
                    TransitionOutcome::AlreadyFailed => ReconcileResult::AlreadyFailed,
                    TransitionOutcome::AlreadySucceeded => ReconcileResult::AlreadySucceeded,
                })
            }
            Some(PaymentStatus::Pending) | None => {
                let payment = self
                    .payments
                    .find_by_id(&id)
                    .await?
                    .ok_or_else(|| PaymentError::not_found(id))?;

                Ok(match payment.status {
                    PaymentStatus::Pending => ReconcileResult::StillPending,
                    PaymentStatus::Succeeded => ReconcileResult::AlreadySucceeded,
                    PaymentStatus::Failed => ReconcileResult::AlreadyFailed,
                })
            }
        }
    }
}

/// Repository errors, with a missing payment and a lost compare-and-set
/// reported as such.
pub(super) fn repository_error(id: &PaymentId, err: DomainError) -> PaymentError {
    match err.code {
        ErrorCode::PaymentNotFound => PaymentError::not_found(*id),
        ErrorCode::ReconciliationConflict => PaymentError::conflict(*id, err.message),
        _ => err.into(),
    }
}
