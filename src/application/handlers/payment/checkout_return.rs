//! Browser return handlers.
//!
//! The processor sends the buyer back to the success or cancel URL built at
//! purchase time. Query parameters on those URLs are attacker-visible, so
//! the success handler only uses the session id stored on the payment and
//! re-fetches its live status from the processor before confirming.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::foundation::{CourseId, PaymentId};
use crate::domain::payment::{GatewayStep, PaymentError, PaymentStatus};
use crate::ports::{PaymentGateway, PaymentRepository};

use super::confirm_payment::{ConfirmPaymentCommand, ConfirmPaymentHandler, ReconcileResult};

/// The buyer came back through the success URL.
#[derive(Debug, Clone)]
pub struct HandleCheckoutReturnCommand {
    pub payment_id: PaymentId,
    /// Session id the processor appended to the URL, if any.
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReturnResult {
    pub payment_id: PaymentId,
    pub course_id: CourseId,
    pub outcome: ReconcileResult,
}

pub struct HandleCheckoutReturnHandler {
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    confirm: ConfirmPaymentHandler,
}

impl HandleCheckoutReturnHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            confirm: ConfirmPaymentHandler::new(payments.clone()),
            payments,
            gateway,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleCheckoutReturnCommand,
    ) -> Result<CheckoutReturnResult, PaymentError> {
        let payment = self
            .payments
            .find_by_id(&cmd.payment_id)
            .await?
            .ok_or_else(|| PaymentError::not_found(cmd.payment_id))?;

        let done = |outcome| CheckoutReturnResult {
            payment_id: payment.id,
            course_id: payment.course_id(),
            outcome,
        };

        // Reloading the success page after settlement needs no processor call.
        if payment.status == PaymentStatus::Succeeded {
            return Ok(done(ReconcileResult::AlreadySucceeded));
        }

        let stored_session = payment.session_id().ok_or_else(|| {
            PaymentError::invalid_request("Payment has no checkout session to confirm")
        })?;

        if let Some(claimed) = cmd.session_id.as_deref() {
            if claimed != stored_session {
                warn!(
                    payment_id = %payment.id,
                    claimed_session = claimed,
                    "return session id does not match payment"
                );
                return Err(PaymentError::validation(
                    "session_id",
                    "does not match the payment's checkout session",
                ));
            }
        }

        if payment.status == PaymentStatus::Failed {
            return Ok(done(ReconcileResult::AlreadyFailed));
        }

        let live = self
            .gateway
            .retrieve_session(stored_session)
            .await
            .map_err(|e| {
                warn!(
                    payment_id = %payment.id,
                    session_id = stored_session,
                    error = %e,
                    "could not retrieve checkout session"
                );
                PaymentError::gateway(GatewayStep::RetrieveSession, e.message, e.retryable)
            })?;

        let outcome = self
            .confirm
            .handle(ConfirmPaymentCommand {
                payment_id: payment.id,
                external_status: live.payment_status,
            })
            .await?;

        Ok(done(outcome))
    }
}

/// The buyer abandoned checkout through the cancel URL.
#[derive(Debug, Clone)]
pub struct HandleCheckoutCancelCommand {
    pub payment_id: PaymentId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutCancelResult {
    pub payment_id: PaymentId,
    pub course_id: CourseId,
    pub status: PaymentStatus,
}

/// Records nothing. An abandoned checkout leaves its payment pending.
pub struct HandleCheckoutCancelHandler {
    payments: Arc<dyn PaymentRepository>,
}

impl HandleCheckoutCancelHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>) -> Self {
        Self { payments }
    }

    pub async fn handle(
        &self,
        cmd: HandleCheckoutCancelCommand,
    ) -> Result<CheckoutCancelResult, PaymentError> {
        let payment = self
            .payments
            .find_by_id(&cmd.payment_id)
            .await?
            .ok_or_else(|| PaymentError::not_found(cmd.payment_id))?;

        info!(payment_id = %payment.id, status = %payment.status, "checkout abandoned");

        Ok(CheckoutCancelResult {
            payment_id: payment.id,
            course_id: payment.course_id(),
            status: payment.status,
        })
    }
}
