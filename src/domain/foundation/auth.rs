//! Authentication types for the domain layer.
//!
//! `AuthenticatedUser` is the identity proven by a bearer token. It carries
//! no privileges: superuser status and course grants live on the stored
//! `User`, which handlers load before asking the access evaluator anything.

use super::UserId;
use thiserror::Error;

/// Identity extracted from a validated session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The user the token was issued to.
    pub id: UserId,

    /// Email claim, when the token carries one.
    pub email: Option<String>,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, email: Option<String>) -> Self {
        Self { id, email }
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// The validator cannot currently check tokens.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if the client should obtain a new token.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::TokenExpired)
    }
}
