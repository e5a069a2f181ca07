//! HTTP handlers for payment endpoints.

use axum::body::Bytes;
use axum::extract::{Json, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::payment::{
    BeginPurchaseCommand, HandleCheckoutCancelCommand, HandleCheckoutReturnCommand,
    HandlePaymentWebhookCommand, ListPaymentsQuery,
};
use crate::domain::foundation::{CourseId, PaymentId};
use crate::domain::payment::PaymentError;

use super::super::error::ApiError;
use super::super::middleware::Session;
use super::super::state::AppState;
use super::dto::{
    CheckoutCancelResponse, CheckoutReturnParams, CheckoutReturnResponse, ListPaymentsParams,
    PaymentResponse, PurchaseRequest, PurchaseResponse, WebhookAck,
};

/// Header carrying the processor's webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// POST /api/courses/:course_id/purchase - Begin a purchase
pub async fn begin_purchase(
    State(state): State<AppState>,
    Session(session): Session,
    Path(course_id): Path<CourseId>,
    body: Option<Json<PurchaseRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = state.principal(Some(&session)).await?;
    let method = body.and_then(|Json(req)| req.method);

    let result = state
        .begin_purchase_handler()
        .handle(BeginPurchaseCommand {
            principal,
            course_id,
            method,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(PurchaseResponse::from(result))))
}

/// GET /api/payments - Payments visible to the caller
pub async fn list_payments(
    State(state): State<AppState>,
    Session(session): Session,
    Query(params): Query<ListPaymentsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let order = params.order()?;
    let principal = state.principal(Some(&session)).await?;

    let payments = state
        .list_payments_handler()
        .handle(ListPaymentsQuery {
            principal,
            course_id: params.course_id,
            method: params.method,
            order,
        })
        .await?;

    let response: Vec<PaymentResponse> = payments.iter().map(PaymentResponse::from).collect();
    Ok(Json(response))
}

/// GET /payments/:payment_id/success - Buyer returns from checkout
pub async fn checkout_success(
    State(state): State<AppState>,
    Path(payment_id): Path<PaymentId>,
    Query(params): Query<CheckoutReturnParams>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .checkout_return_handler()
        .handle(HandleCheckoutReturnCommand {
            payment_id,
            session_id: params.session_id,
        })
        .await?;

    Ok(Json(CheckoutReturnResponse::from(result)))
}

/// GET /payments/:payment_id/cancel - Buyer abandoned checkout
pub async fn checkout_cancel(
    State(state): State<AppState>,
    Path(payment_id): Path<PaymentId>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .checkout_cancel_handler()
        .handle(HandleCheckoutCancelCommand { payment_id })
        .await?;

    Ok(Json(CheckoutCancelResponse::from(result)))
}

/// POST /webhooks/stripe - Processor event delivery
///
/// Unmatched and ignored events are acknowledged with 200 so the processor
/// stops redelivering them. Storage failures surface as 5xx to get a retry.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        tracing::warn!(
            payload_bytes = body.len(),
            "Webhook rejected: missing or unreadable Stripe-Signature header"
        );
        return Err(PaymentError::SignatureInvalid.into());
    };
    let signature = signature.to_string();

    let result = state
        .webhook_handler()
        .handle(HandlePaymentWebhookCommand {
            payload: body.to_vec(),
            signature,
        })
        .await?;

    Ok(Json(WebhookAck::from(result)))
}
