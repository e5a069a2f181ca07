//! Axum router configuration for payment endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::super::state::AppState;
use super::handlers::{checkout_cancel, checkout_success, list_payments, stripe_webhook};

/// Create the payment API router, mounted at `/api/payments`.
///
/// # Routes
/// - `GET /` - List payments (own payments, or all for superusers)
pub fn payment_api_routes() -> Router<AppState> {
    Router::new().route("/", get(list_payments))
}

/// Create the checkout redirect router, mounted at `/payments`.
///
/// Hit by the buyer's browser after the hosted checkout page. No
/// authentication: the payment id is unguessable and the processor is the
/// source of truth for the outcome.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/:payment_id/success", get(checkout_success))
        .route("/:payment_id/cancel", get(checkout_cancel))
}

/// Create the webhook router, mounted at `/webhooks`.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/stripe", post(stripe_webhook))
}
