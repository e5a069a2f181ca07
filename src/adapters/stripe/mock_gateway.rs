//! Mock payment gateway for testing.
//!
//! Provides a configurable implementation of `PaymentGateway` for unit and
//! integration tests. Supports:
//! - Scripted processor ids
//! - Per-session status control
//! - Error injection per method
//! - Call tracking
//! - Webhook verification modes

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use secrecy::SecretString;

use crate::domain::payment::ExternalPaymentStatus;
use crate::ports::{
    CheckoutSession, CheckoutSessionStatus, CreateCheckoutSessionRequest, GatewayError,
    GatewayPrice, GatewayProduct, PaymentGateway, WebhookEvent,
};

use super::signature::WebhookSignatureVerifier;
use super::stripe_adapter::parse_stripe_event;

/// Mock payment gateway for testing.
///
/// # Example
///
/// ```ignore
/// let gateway = MockPaymentGateway::new();
/// gateway.fail_on("create_price", GatewayError::network("reset"));
/// gateway.set_session_status("sess_1", ExternalPaymentStatus::Paid);
/// ```
#[derive(Clone, Default)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

struct MockState {
    product_id: String,
    price_id: String,
    session_id: String,
    session_url: String,

    /// Live status per session id, as `retrieve_session` reports it.
    sessions: HashMap<String, ExternalPaymentStatus>,

    /// Errors returned by a method until cleared.
    method_errors: HashMap<&'static str, GatewayError>,

    call_log: Vec<MethodCall>,

    webhook_verify_mode: WebhookVerifyMode,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            product_id: "prod_1".to_string(),
            price_id: "price_1".to_string(),
            session_id: "sess_1".to_string(),
            session_url: "https://checkout.example/sess_1".to_string(),
            sessions: HashMap::new(),
            method_errors: HashMap::new(),
            call_log: Vec::new(),
            webhook_verify_mode: WebhookVerifyMode::default(),
        }
    }
}

/// Recorded method call for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub method: &'static str,
    pub args: Vec<String>,
}

/// How to handle webhook verification.
#[derive(Default, Clone)]
enum WebhookVerifyMode {
    /// Skip the signature; parse any Stripe-shaped payload.
    #[default]
    AcceptAll,

    /// Verify against this signing secret like the real adapter.
    RequireSignature(SecretString),

    /// Always fail verification.
    RejectAll,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that verifies webhook signatures with `secret`.
    pub fn with_webhook_secret(secret: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.state().webhook_verify_mode =
            WebhookVerifyMode::RequireSignature(SecretString::new(secret.into()));
        mock
    }

    /// Create a mock that fails all webhook verifications.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.state().webhook_verify_mode = WebhookVerifyMode::RejectAll;
        mock
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Ids returned by the next purchase calls.
    pub fn set_ids(
        &self,
        product_id: impl Into<String>,
        price_id: impl Into<String>,
        session_id: impl Into<String>,
    ) {
        let mut state = self.state();
        state.product_id = product_id.into();
        state.price_id = price_id.into();
        state.session_id = session_id.into();
        state.session_url = format!("https://checkout.example/{}", state.session_id);
    }

    /// Status `retrieve_session` reports for `session_id`.
    pub fn set_session_status(&self, session_id: impl Into<String>, status: ExternalPaymentStatus) {
        self.state().sessions.insert(session_id.into(), status);
    }

    /// Make `method` fail with `error` until `clear_failures`.
    pub fn fail_on(&self, method: &'static str, error: GatewayError) {
        self.state().method_errors.insert(method, error);
    }

    pub fn clear_failures(&self) {
        self.state().method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Inspection Methods
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    fn record(&self, method: &'static str, args: Vec<String>) -> Result<(), GatewayError> {
        let mut state = self.state();
        state.call_log.push(MethodCall { method, args });
        match state.method_errors.get(method) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_product(&self, name: &str) -> Result<GatewayProduct, GatewayError> {
        self.record("create_product", vec![name.to_string()])?;
        Ok(GatewayProduct {
            id: self.state().product_id.clone(),
        })
    }

    async fn create_price(
        &self,
        product_id: &str,
        amount_minor_units: i64,
    ) -> Result<GatewayPrice, GatewayError> {
        self.record(
            "create_price",
            vec![product_id.to_string(), amount_minor_units.to_string()],
        )?;
        Ok(GatewayPrice {
            id: self.state().price_id.clone(),
        })
    }

    async fn create_checkout_session(
        &self,
        request: CreateCheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        self.record(
            "create_checkout_session",
            vec![request.price_id, request.success_url, request.cancel_url],
        )?;
        let mut state = self.state();
        let id = state.session_id.clone();
        state
            .sessions
            .entry(id.clone())
            .or_insert(ExternalPaymentStatus::Unpaid);
        Ok(CheckoutSession {
            id,
            url: state.session_url.clone(),
        })
    }

    async fn retrieve_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionStatus, GatewayError> {
        self.record("retrieve_session", vec![session_id.to_string()])?;
        let status = self
            .state()
            .sessions
            .get(session_id)
            .copied()
            .ok_or_else(|| GatewayError::not_found("checkout session"))?;
        Ok(CheckoutSessionStatus {
            session_id: session_id.to_string(),
            payment_status: status,
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, GatewayError> {
        self.record("verify_webhook", vec![signature.to_string()])?;
        let mode = self.state().webhook_verify_mode.clone();
        match mode {
            WebhookVerifyMode::AcceptAll => {}
            WebhookVerifyMode::RequireSignature(secret) => {
                WebhookSignatureVerifier::new(secret).verify(payload, signature)?;
            }
            WebhookVerifyMode::RejectAll => {
                return Err(GatewayError::invalid_webhook("Invalid signature"));
            }
        }
        parse_stripe_event(payload, false)
    }
}
