//! Session validation port for JWT token validation.
//!
//! This port defines the contract for validating access tokens and extracting
//! user identity. It is provider-agnostic - implementations exist for shared
//! secret HS256 tokens and mock testing.
//!
//! # Security Requirements
//!
//! All implementations MUST validate:
//! - **Issuer (iss)**: Token must come from expected auth provider
//! - **Audience (aud)**: Token must be intended for this application
//! - **Expiry (exp)**: Token must not be expired
//!
//! # Example Implementation
//!
//! ```ignore
//! pub struct JwtSessionValidator { ... }
//!
//! #[async_trait]
//! impl SessionValidator for JwtSessionValidator {
//!     async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
//!         // 1. Verify the HS256 signature
//!         // 2. Validate iss, aud, exp claims
//!         // 3. Parse `sub` as the user id
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::domain::foundation::{AuthenticatedUser, AuthError};

/// Validates access tokens and extracts user identity.
///
/// This is the primary port for authentication. HTTP middleware uses this
/// to validate Bearer tokens and extract the authenticated user.
///
/// # Contract
///
/// Implementations must:
/// - Validate the token signature
/// - Validate issuer, audience, and expiry claims
/// - Return `AuthError::InvalidToken` for malformed/bad signature tokens
/// - Return `AuthError::TokenExpired` for expired tokens
/// - Return `AuthError::ServiceUnavailable` for transient errors
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a JWT access token and return the authenticated user.
    ///
    /// # Arguments
    ///
    /// * `token` - The raw JWT token (without "Bearer " prefix)
    ///
    /// # Returns
    ///
    /// * `Ok(AuthenticatedUser)` - Token is valid, user extracted from claims
    /// * `Err(AuthError::InvalidToken)` - Token is malformed or signature invalid
    /// * `Err(AuthError::TokenExpired)` - Token signature valid but expired
    /// * `Err(AuthError::ServiceUnavailable)` - Auth provider unreachable
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
