//! HTTP adapter for payment endpoints.
//!
//! - `GET /api/payments` - List payments
//! - `GET /payments/:payment_id/success` - Checkout success redirect
//! - `GET /payments/:payment_id/cancel` - Checkout cancel redirect
//! - `POST /webhooks/stripe` - Processor webhook

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use routes::{checkout_routes, payment_api_routes, webhook_routes};
