//! Access token issuing port.
//!
//! Tokens issued here must be accepted by the configured `SessionValidator`.

use crate::domain::foundation::{AuthError, UserId};
use serde::Serialize;

/// A signed bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user_id: &UserId, email: Option<&str>) -> Result<IssuedToken, AuthError>;
}
