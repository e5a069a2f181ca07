//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` port for Stripe integration, including:
//! - Products and one-time prices
//! - Hosted checkout sessions
//! - Session status retrieval
//! - Webhook signature verification
//!
//! # Security
//!
//! - Webhook signatures use HMAC-SHA256 with constant-time comparison
//! - Timestamps are validated to prevent replay attacks (5-minute window)
//! - All secrets are handled via `secrecy::SecretString`

mod mock_gateway;
mod signature;
mod stripe_adapter;
mod webhook_types;

pub use mock_gateway::{MethodCall, MockPaymentGateway};
pub use signature::{compute_signature_header, WebhookSignatureVerifier};
pub use stripe_adapter::{StripeConfig, StripeGateway};
pub use webhook_types::{
    SignatureHeader, SignatureParseError, StripeCheckoutSession, StripePrice, StripeProduct,
    StripeWebhookEvent,
};
