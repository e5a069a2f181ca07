//! Top-level router assembly.

use axum::{middleware, routing::get, Json, Router};
use serde_json::{json, Value};

use super::courses::course_routes;
use super::middleware::{session_middleware, AuthState};
use super::payments::{checkout_routes, payment_api_routes, webhook_routes};
use super::state::AppState;
use super::users::{token_routes, user_routes};

/// GET /health - Liveness check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the full application router.
///
/// The auth middleware runs on every route. It only rejects requests that
/// carry a bad token, so the webhook and checkout redirects stay reachable
/// without credentials.
pub fn api_router(state: AppState, validator: AuthState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/courses", course_routes())
        .nest("/api/payments", payment_api_routes())
        .nest("/api/users", user_routes())
        .nest("/api/token", token_routes())
        .nest("/payments", checkout_routes())
        .nest("/webhooks", webhook_routes())
        .layer(middleware::from_fn_with_state(validator, session_middleware))
        .with_state(state)
}
