//! Bearer session resolution for the PaperSkill API.
//!
//! [`session_middleware`] runs on every route. A request without an
//! `Authorization: Bearer` header continues anonymously, because the catalog
//! is public and the access evaluator decides what an anonymous visitor sees.
//! A request that does present a token must present a valid one: a bad or
//! expired token is answered with 401 before any handler runs, so a client
//! never silently falls back to the anonymous view.
//!
//! Handlers then pick an extractor:
//! - [`Session`] for operations that need a signed-in user (buying, authoring,
//!   account edits), rejecting with 401 otherwise;
//! - [`OptionalSession`] for catalog reads.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

use super::super::error::ErrorResponse;

/// Validator shared by the middleware layer.
pub type AuthState = Arc<dyn SessionValidator>;

/// Token from `Authorization: Bearer <token>`. The scheme is case-insensitive;
/// other schemes are ignored.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}

fn rejection(error: &AuthError) -> Response {
    let (status, code, message) = match error {
        AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED", "Session token expired"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Invalid session token"),
        AuthError::ServiceUnavailable(reason) => {
            tracing::error!(reason = %reason, "session validation unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "Session validation unavailable",
            )
        }
    };
    (status, Json(ErrorResponse::new(code, message))).into_response()
}

/// Resolves the bearer token, if any, into an [`AuthenticatedUser`] request extension.
pub async fn session_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return next.run(request).await;
    };

    match validator.validate(token).await {
        Ok(user) => {
            tracing::debug!(user_id = %user.id, "session resolved");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "session token rejected");
            rejection(&e)
        }
    }
}

/// The signed-in caller. Rejects anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct Session(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = MissingSession;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(Session)
            .ok_or(MissingSession)
    }
}

/// The caller's session when one was presented, `None` for anonymous visitors.
#[derive(Debug, Clone)]
pub struct OptionalSession(pub Option<AuthenticatedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalSession(
            parts.extensions.get::<AuthenticatedUser>().cloned(),
        ))
    }
}

/// Returned by [`Session`] when the request carried no token.
#[derive(Debug, Clone, Copy)]
pub struct MissingSession;

impl IntoResponse for MissingSession {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("UNAUTHORIZED", "Sign in to continue")),
        )
            .into_response()
    }
}
