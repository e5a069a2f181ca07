//! Axum router configuration for account endpoints.

use axum::{
    routing::{patch, post},
    Router,
};

use super::super::state::AppState;
use super::handlers::{issue_token, register_user, update_user};

/// Account routes, mounted at `/api/users`.
///
/// - `POST /` - Register (public)
/// - `PATCH /:user_id` - Edit (authenticated)
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(register_user))
        .route("/:user_id", patch(update_user))
}

/// Login route, mounted at `/api/token`.
pub fn token_routes() -> Router<AppState> {
    Router::new().route("/", post(issue_token))
}
