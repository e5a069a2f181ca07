//! HandlePaymentWebhookHandler - Command handler for processor notifications.
//!
//! The signature is verified before anything is read from the payload. A
//! verified checkout event is matched to a payment by session id and its
//! status is handed to the reconciler. Unmatched sessions and unrelated
//! event types are acknowledged, because the processor redelivers anything
//! that is not acknowledged.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::foundation::PaymentId;
use crate::domain::payment::PaymentError;
use crate::ports::{CheckoutUpdate, PaymentGateway, PaymentRepository};

use super::confirm_payment::{ConfirmPaymentCommand, ConfirmPaymentHandler, ReconcileResult};

#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header value.
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlePaymentWebhookResult {
    /// A payment was found and reconciled.
    Reconciled {
        payment_id: PaymentId,
        outcome: ReconcileResult,
    },
    /// No payment carries this session id.
    Unmatched { session_id: String },
    /// Event type we do not act on.
    Ignored { event_type: String },
}

pub struct HandlePaymentWebhookHandler {
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    confirm: ConfirmPaymentHandler,
}

impl HandlePaymentWebhookHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            confirm: ConfirmPaymentHandler::new(payments.clone()),
            payments,
            gateway,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, PaymentError> {
        // 1. Verify signature and parse event
        let event = self
            .gateway
            .verify_webhook(&cmd.payload, &cmd.signature)
            .await
            .map_err(|e| {
                warn!(error = %e, "webhook rejected");
                PaymentError::SignatureInvalid
            })?;

        // 2. Only checkout events carry a session
        let Some(CheckoutUpdate {
            session_id,
            payment_status: status,
        }) = event.checkout
        else {
            debug!(event_id = %event.id, event_type = %event.event_type, "webhook ignored");
            return Ok(HandlePaymentWebhookResult::Ignored {
                event_type: event.event_type,
            });
        };

        // 3. Locate the payment
        let Some(payment) = self.payments.find_by_session_id(&session_id).await? else {
            warn!(
                event_id = %event.id,
                session_id = %session_id,
                "webhook session matches no payment"
            );
            return Ok(HandlePaymentWebhookResult::Unmatched { session_id });
        };

        // 4. Reconcile
        let outcome = self
            .confirm
            .handle(ConfirmPaymentCommand {
                payment_id: payment.id,
                external_status: status,
            })
            .await?;

        info!(
            event_id = %event.id,
            payment_id = %payment.id,
            outcome = outcome.as_str(),
            "webhook reconciled"
        );

        Ok(HandlePaymentWebhookResult::Reconciled {
            payment_id: payment.id,
            outcome,
        })
    }
}
