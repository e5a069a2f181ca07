//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` port against the Stripe REST API:
//! products, one-time prices, hosted checkout sessions, session retrieval
//! and webhook verification.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window by default) for replay protection
//! - Secrets handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key, webhook_secret).with_currency("rub");
//! let gateway = StripeGateway::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::domain::payment::ExternalPaymentStatus;
use crate::ports::{
    CheckoutSession, CheckoutSessionStatus, CheckoutUpdate, CreateCheckoutSessionRequest,
    GatewayError, GatewayErrorKind, GatewayPrice, GatewayProduct, PaymentGateway, WebhookEvent,
};

use super::signature::{WebhookSignatureVerifier, DEFAULT_TOLERANCE_SECS};
use super::webhook_types::{
    StripeCheckoutSession, StripeErrorEnvelope, StripePrice, StripeProduct, StripeWebhookEvent,
};

/// Placeholder Stripe replaces with the real session id on redirect.
const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_CURRENCY: &str = "rub";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    api_base_url: String,

    /// ISO currency code prices are created in, lowercase.
    currency: String,

    /// Reject test-mode webhook events.
    require_livemode: bool,

    webhook_tolerance_secs: i64,

    request_timeout: Duration,
}

impl StripeConfig {
    pub fn new(api_key: SecretString, webhook_secret: SecretString) -> Self {
        Self {
            api_key,
            webhook_secret,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            require_livemode: false,
            webhook_tolerance_secs: DEFAULT_TOLERANCE_SECS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into().to_lowercase();
        self
    }

    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }

    pub fn with_webhook_tolerance_secs(mut self, secs: i64) -> Self {
        self.webhook_tolerance_secs = secs;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Stripe payment gateway adapter.
pub struct StripeGateway {
    config: StripeConfig,
    verifier: WebhookSignatureVerifier,
    http_client: reqwest::Client,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::network(format!("Failed to build HTTP client: {}", e)))?;

        let verifier = WebhookSignatureVerifier::new(config.webhook_secret.clone())
            .with_tolerance_secs(config.webhook_tolerance_secs);

        Ok(Self {
            config,
            verifier,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let response = self
            .http_client
            .post(self.url(path))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(params)
            .send()
            .await
            .map_err(transport_error)?;

        read_response(path, response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let response = self
            .http_client
            .get(self.url(path))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(transport_error)?;

        read_response(path, response).await
    }
}

/// Parse a verified Stripe event and convert it to port types.
pub(super) fn parse_stripe_event(
    payload: &[u8],
    require_livemode: bool,
) -> Result<WebhookEvent, GatewayError> {
    let stripe_event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
        tracing::warn!(error = %e, "Failed to parse webhook payload");
        GatewayError::invalid_webhook(format!("Invalid JSON: {}", e))
    })?;

    if require_livemode && !stripe_event.livemode {
        tracing::warn!(
            event_id = %stripe_event.id,
            "Rejected test mode event in production"
        );
        return Err(GatewayError::invalid_webhook(
            "Test mode events not allowed in production",
        ));
    }

    let checkout = checkout_update(&stripe_event)?;

    Ok(WebhookEvent {
        id: stripe_event.id,
        event_type: stripe_event.event_type,
        created_at: stripe_event.created,
        checkout,
    })
}

/// Session outcome carried by a checkout event, `None` for every other event.
///
/// `completed` defers to the session's own payment status because delayed
/// payment methods complete the session before the money arrives.
fn checkout_update(event: &StripeWebhookEvent) -> Result<Option<CheckoutUpdate>, GatewayError> {
    let implied = match event.event_type.as_str() {
        "checkout.session.completed" => None,
        "checkout.session.async_payment_succeeded" => Some(ExternalPaymentStatus::Paid),
        "checkout.session.async_payment_failed" | "checkout.session.expired" => {
            Some(ExternalPaymentStatus::Failed)
        }
        _ => return Ok(None),
    };

    let session: StripeCheckoutSession = serde_json::from_value(event.data.object.clone())
        .map_err(|e| GatewayError::invalid_webhook(format!("Invalid checkout session: {}", e)))?;

    Ok(Some(CheckoutUpdate {
        payment_status: implied.unwrap_or_else(|| session.external_status()),
        session_id: session.id,
    }))
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::timeout(err.to_string())
    } else {
        GatewayError::network(err.to_string())
    }
}

async fn read_response<T: DeserializeOwned>(
    path: &str,
    response: reqwest::Response,
) -> Result<T, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return response.json().await.map_err(|e| {
            GatewayError::processor(format!("Failed to parse Stripe response: {}", e))
        });
    }

    let body = response.text().await.unwrap_or_default();
    let api_error = serde_json::from_str::<StripeErrorEnvelope>(&body)
        .ok()
        .map(|envelope| envelope.error);

    let message = api_error
        .as_ref()
        .and_then(|e| e.message.clone())
        .unwrap_or_else(|| format!("Stripe API returned {}", status));

    tracing::error!(
        path,
        status = status.as_u16(),
        error = %message,
        "Stripe API request failed"
    );

    let mut error = match status.as_u16() {
        400 | 402 => GatewayError::invalid_request(message),
        401 | 403 => GatewayError::authentication(message),
        404 => GatewayError::new(GatewayErrorKind::NotFound, message),
        429 => GatewayError::rate_limited(message),
        500..=599 => GatewayError::processor(message),
        _ => GatewayError::new(GatewayErrorKind::Unknown, message),
    };
    if status.is_server_error() {
        error.retryable = true;
    }
    if let Some(code) = api_error.and_then(|e| e.code.or(Some(e.error_type))) {
        error = error.with_processor_code(code);
    }
    Err(error)
}

/// Appends the session id placeholder so the redirect carries it back.
fn success_url_with_session(success_url: &str) -> String {
    let separator = if success_url.contains('?') { '&' } else { '?' };
    format!("{}{}session_id={}", success_url, separator, SESSION_ID_PLACEHOLDER)
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_product(&self, name: &str) -> Result<GatewayProduct, GatewayError> {
        let product: StripeProduct = self
            .post_form("/v1/products", &[("name", name.to_string())])
            .await?;

        tracing::debug!(product_id = %product.id, "Stripe product created");
        Ok(GatewayProduct { id: product.id })
    }

    async fn create_price(
        &self,
        product_id: &str,
        amount_minor_units: i64,
    ) -> Result<GatewayPrice, GatewayError> {
        if amount_minor_units <= 0 {
            return Err(GatewayError::invalid_request("Price amount must be positive"));
        }

        let price: StripePrice = self
            .post_form(
                "/v1/prices",
                &[
                    ("product", product_id.to_string()),
                    ("unit_amount", amount_minor_units.to_string()),
                    ("currency", self.config.currency.clone()),
                ],
            )
            .await?;

        tracing::debug!(price_id = %price.id, "Stripe price created");
        Ok(GatewayPrice { id: price.id })
    }

    async fn create_checkout_session(
        &self,
        request: CreateCheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let params = [
            ("mode", "payment".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][price]", request.price_id),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", success_url_with_session(&request.success_url)),
            ("cancel_url", request.cancel_url),
        ];

        let session: StripeCheckoutSession =
            self.post_form("/v1/checkout/sessions", &params).await?;

        let url = session.url.ok_or_else(|| {
            GatewayError::processor("Stripe returned a checkout session without a URL")
        })?;

        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    async fn retrieve_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionStatus, GatewayError> {
        let session: StripeCheckoutSession = self
            .get(&format!("/v1/checkout/sessions/{}", session_id))
            .await?;

        Ok(CheckoutSessionStatus {
            payment_status: session.external_status(),
            session_id: session.id,
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, GatewayError> {
        self.verifier.verify(payload, signature)?;
        let event = parse_stripe_event(payload, self.config.require_livemode)?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            "Webhook signature verified"
        );

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::compute_signature_header;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Form, Json, Router};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    const SECRET: &str = "whsec_test_secret";

    fn test_config() -> StripeConfig {
        StripeConfig::new(
            SecretString::new("sk_test_key".to_string()),
            SecretString::new(SECRET.to_string()),
        )
    }

    fn gateway(config: StripeConfig) -> StripeGateway {
        StripeGateway::new(config).unwrap()
    }

    fn signed(payload: &str) -> String {
        compute_signature_header(SECRET, chrono::Utc::now().timestamp(), payload.as_bytes())
    }

    fn checkout_event(event_type: &str, payment_status: &str, status: &str, livemode: bool) -> String {
        serde_json::json!({
            "id": "evt_1",
            "type": event_type,
            "created": 1704067200,
            "livemode": livemode,
            "data": { "object": {
                "id": "cs_test_1",
                "object": "checkout.session",
                "payment_status": payment_status,
                "status": status,
                "mode": "payment"
            }}
        })
        .to_string()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn config_new_sets_defaults() {
        let config = test_config();
        assert_eq!(config.api_base_url, "https://api.stripe.com");
        assert_eq!(config.currency, "rub");
        assert!(!config.require_livemode);
        assert_eq!(config.webhook_tolerance_secs, 300);
    }

    #[test]
    fn config_builders_normalize() {
        let config = test_config()
            .with_base_url("http://localhost:8080/")
            .with_currency("USD");
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.currency, "usd");
    }

    #[test]
    fn success_url_gets_session_placeholder() {
        assert_eq!(
            success_url_with_session("https://shop/payments/1/success"),
            "https://shop/payments/1/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(
            success_url_with_session("https://shop/ok?x=1"),
            "https://shop/ok?x=1&session_id={CHECKOUT_SESSION_ID}"
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Webhook Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn verify_webhook_parses_completed_session() {
        let gateway = gateway(test_config());
        let payload = checkout_event("checkout.session.completed", "paid", "complete", false);

        let event = gateway
            .verify_webhook(payload.as_bytes(), &signed(&payload))
            .await
            .unwrap();

        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(
            event.checkout,
            Some(CheckoutUpdate {
                session_id: "cs_test_1".to_string(),
                payment_status: ExternalPaymentStatus::Paid,
            })
        );
    }

    #[tokio::test]
    async fn expired_and_async_failed_sessions_are_failures() {
        let gateway = gateway(test_config());
        for event_type in [
            "checkout.session.expired",
            "checkout.session.async_payment_failed",
        ] {
            let payload = checkout_event(event_type, "unpaid", "expired", false);
            let event = gateway
                .verify_webhook(payload.as_bytes(), &signed(&payload))
                .await
                .unwrap();
            let update = event.checkout.unwrap();
            assert_eq!(update.payment_status, ExternalPaymentStatus::Failed);
        }
    }

    #[tokio::test]
    async fn non_checkout_event_carries_no_update() {
        let gateway = gateway(test_config());
        let payload = serde_json::json!({
            "id": "evt_2",
            "type": "invoice.paid",
            "created": 1704067200,
            "livemode": false,
            "data": { "object": { "id": "in_1" } }
        })
        .to_string();

        let event = gateway
            .verify_webhook(payload.as_bytes(), &signed(&payload))
            .await
            .unwrap();

        assert_eq!(event.event_type, "invoice.paid");
        assert_eq!(event.checkout, None);
    }

    #[tokio::test]
    async fn verify_webhook_rejects_invalid_signature() {
        let gateway = gateway(test_config());
        let payload = checkout_event("checkout.session.completed", "paid", "complete", false);
        let header = compute_signature_header("whsec_wrong", chrono::Utc::now().timestamp(), payload.as_bytes());

        let err = gateway
            .verify_webhook(payload.as_bytes(), &header)
            .await
            .unwrap_err();
        assert!(err.is_invalid_webhook());
    }

    #[tokio::test]
    async fn verify_webhook_rejects_invalid_json() {
        let gateway = gateway(test_config());
        let payload = "not json";
        let err = gateway
            .verify_webhook(payload.as_bytes(), &signed(payload))
            .await
            .unwrap_err();
        assert!(err.is_invalid_webhook());
    }

    #[tokio::test]
    async fn parse_rejects_test_mode_in_production() {
        let gateway = gateway(test_config().with_require_livemode(true));
        let payload = checkout_event("checkout.session.completed", "paid", "complete", false);
        let err = gateway
            .verify_webhook(payload.as_bytes(), &signed(&payload))
            .await
            .unwrap_err();
        assert!(err.message.contains("Test mode"));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // API Tests (against a local fake)
    // ════════════════════════════════════════════════════════════════════════════

    type Captured = Arc<Mutex<Vec<(String, HashMap<String, String>)>>>;

    async fn fake_stripe() -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));

        async fn product(
            State(c): State<Captured>,
            Form(form): Form<HashMap<String, String>>,
        ) -> Json<serde_json::Value> {
            c.lock().unwrap().push(("product".into(), form));
            Json(serde_json::json!({"id": "prod_1", "name": "Course Rust"}))
        }
        async fn price(
            State(c): State<Captured>,
            Form(form): Form<HashMap<String, String>>,
        ) -> Json<serde_json::Value> {
            c.lock().unwrap().push(("price".into(), form));
            Json(serde_json::json!({"id": "price_1", "unit_amount": 50000, "currency": "rub"}))
        }
        async fn session(
            State(c): State<Captured>,
            Form(form): Form<HashMap<String, String>>,
        ) -> Json<serde_json::Value> {
            c.lock().unwrap().push(("session".into(), form));
            Json(serde_json::json!({
                "id": "cs_1",
                "payment_status": "unpaid",
                "status": "open",
                "url": "https://checkout.stripe.com/c/pay/cs_1"
            }))
        }
        async fn retrieve(Path(id): Path<String>) -> (StatusCode, Json<serde_json::Value>) {
            if id == "cs_revoked_key" {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({"error": {
                        "type": "invalid_request_error",
                        "message": "Invalid API Key provided"
                    }})),
                );
            }
            if id == "cs_missing" {
                return (
                    StatusCode::NOT_FOUND,
                    Json(serde_json::json!({"error": {
                        "type": "invalid_request_error",
                        "code": "resource_missing",
                        "message": "No such checkout.session"
                    }})),
                );
            }
            (
                StatusCode::OK,
                Json(serde_json::json!({"id": id, "payment_status": "paid", "status": "complete"})),
            )
        }

        let app = Router::new()
            .route("/v1/products", post(product))
            .route("/v1/prices", post(price))
            .route("/v1/checkout/sessions", post(session))
            .route("/v1/checkout/sessions/:id", get(retrieve))
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), captured)
    }

    #[tokio::test]
    async fn purchase_calls_send_minor_units_and_payment_mode() {
        let (base, captured) = fake_stripe().await;
        let gateway = gateway(test_config().with_base_url(base));

        let product = gateway.create_product("Course Rust").await.unwrap();
        let price = gateway.create_price(&product.id, 50_000).await.unwrap();
        let session = gateway
            .create_checkout_session(CreateCheckoutSessionRequest {
                price_id: price.id.clone(),
                success_url: "https://shop/payments/1/success".into(),
                cancel_url: "https://shop/payments/1/cancel".into(),
            })
            .await
            .unwrap();

        assert_eq!(product.id, "prod_1");
        assert_eq!(price.id, "price_1");
        assert_eq!(session.id, "cs_1");
        assert_eq!(session.url, "https://checkout.stripe.com/c/pay/cs_1");

        let calls = captured.lock().unwrap();
        assert_eq!(calls[0].1["name"], "Course Rust");
        assert_eq!(calls[1].1["unit_amount"], "50000");
        assert_eq!(calls[1].1["currency"], "rub");
        assert_eq!(calls[1].1["product"], "prod_1");
        assert_eq!(calls[2].1["mode"], "payment");
        assert_eq!(calls[2].1["payment_method_types[0]"], "card");
        assert_eq!(calls[2].1["line_items[0][quantity]"], "1");
        assert_eq!(
            calls[2].1["success_url"],
            "https://shop/payments/1/success?session_id={CHECKOUT_SESSION_ID}"
        );
    }

    #[tokio::test]
    async fn retrieve_session_maps_status_and_errors() {
        let (base, _) = fake_stripe().await;
        let gateway = gateway(test_config().with_base_url(base));

        let status = gateway.retrieve_session("cs_1").await.unwrap();
        assert_eq!(status.payment_status, ExternalPaymentStatus::Paid);

        let err = gateway.retrieve_session("cs_missing").await.unwrap_err();
        assert_eq!(err.kind, GatewayErrorKind::NotFound);
        assert_eq!(err.processor_code.as_deref(), Some("resource_missing"));
        assert!(!err.retryable);
    }

    #[tokio::test]
    async fn rejected_api_key_is_an_authentication_error() {
        let (base, _) = fake_stripe().await;
        let gateway = gateway(test_config().with_base_url(base));

        let err = gateway.retrieve_session("cs_revoked_key").await.unwrap_err();

        assert_eq!(err.kind, GatewayErrorKind::Authentication);
        assert_eq!(err.message, "Invalid API Key provided");
        assert_eq!(err.processor_code.as_deref(), Some("invalid_request_error"));
        assert!(!err.retryable);
    }

    #[tokio::test]
    async fn create_price_rejects_non_positive_amount() {
        let gateway = gateway(test_config());
        let err = gateway.create_price("prod_1", 0).await.unwrap_err();
        assert_eq!(err.kind, GatewayErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn unreachable_api_is_retryable() {
        let gateway = gateway(
            test_config()
                .with_base_url("http://127.0.0.1:9")
                .with_request_timeout(Duration::from_millis(500)),
        );
        let err = gateway.create_product("Course Rust").await.unwrap_err();
        assert!(err.retryable);
    }
}
