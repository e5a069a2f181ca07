//! Card processor port.
//!
//! A paid course is sold through a hosted checkout: the purchase flow creates
//! a product and a one-time price for the course, opens a checkout session
//! for that price and redirects the buyer to it. The processor later reports
//! the result twice, once through a signed webhook and once when the buyer's
//! browser returns and the session is fetched. Both paths end in the same
//! reconciliation.
//!
//! Amounts cross this port in minor units (kopecks, cents). Currency, API
//! keys and the wire format belong to the adapter.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::payment::ExternalPaymentStatus;

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_product(&self, name: &str) -> Result<GatewayProduct, GatewayError>;

    /// One-time price of `amount_minor_units` for `product_id`.
    async fn create_price(
        &self,
        product_id: &str,
        amount_minor_units: i64,
    ) -> Result<GatewayPrice, GatewayError>;

    /// Hosted checkout for a single unit of the price.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Live status of a checkout session. Authoritative for the return path.
    async fn retrieve_session(&self, session_id: &str)
        -> Result<CheckoutSessionStatus, GatewayError>;

    /// Authenticates a webhook delivery and decodes it.
    ///
    /// Fails with [`GatewayErrorKind::InvalidWebhook`] when the signature,
    /// timestamp or body is not acceptable.
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, GatewayError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayProduct {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayPrice {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCheckoutSessionRequest {
    pub price_id: String,
    /// Buyer lands here after paying.
    pub success_url: String,
    /// Buyer lands here after abandoning checkout.
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted page the buyer is redirected to.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionStatus {
    pub session_id: String,
    pub payment_status: ExternalPaymentStatus,
}

/// A verified webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    pub id: String,
    /// Processor's event name, e.g. `checkout.session.completed`.
    pub event_type: String,
    /// Unix seconds.
    pub created_at: i64,
    /// Present only for events that settle or fail a checkout session.
    pub checkout: Option<CheckoutUpdate>,
}

/// What a checkout event says about its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutUpdate {
    pub session_id: String,
    pub payment_status: ExternalPaymentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
    /// Processor's own error code, e.g. `resource_missing`.
    pub processor_code: Option<String>,
    /// Whether repeating the same call may succeed.
    pub retryable: bool,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            processor_code: None,
            retryable: kind.is_transient(),
        }
    }

    pub fn with_processor_code(mut self, code: impl Into<String>) -> Self {
        self.processor_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Timeout, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Authentication, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::InvalidRequest, message)
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(GatewayErrorKind::NotFound, format!("{} not found", what))
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::RateLimited, message)
    }

    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::InvalidWebhook, message)
    }

    /// The processor answered but failed on its side.
    pub fn processor(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Processor, message)
    }

    pub fn is_invalid_webhook(&self) -> bool {
        self.kind == GatewayErrorKind::InvalidWebhook
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayErrorKind {
    Network,
    Timeout,
    /// API key missing, revoked or lacking permission.
    Authentication,
    /// Amount, currency or URL refused by the processor.
    InvalidRequest,
    NotFound,
    RateLimited,
    InvalidWebhook,
    Processor,
    Unknown,
}

impl GatewayErrorKind {
    /// Failures that say nothing about the request itself.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            GatewayErrorKind::Network | GatewayErrorKind::Timeout | GatewayErrorKind::RateLimited
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GatewayErrorKind::Network => "network",
            GatewayErrorKind::Timeout => "timeout",
            GatewayErrorKind::Authentication => "authentication",
            GatewayErrorKind::InvalidRequest => "invalid_request",
            GatewayErrorKind::NotFound => "not_found",
            GatewayErrorKind::RateLimited => "rate_limited",
            GatewayErrorKind::InvalidWebhook => "invalid_webhook",
            GatewayErrorKind::Processor => "processor",
            GatewayErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
