//! Shared-secret JWT adapter for session validation and login tokens.
//!
//! `JwtTokenIssuer` signs HS256 tokens at login and `JwtSessionValidator`
//! checks them. Both read the same `JwtConfig`.
//!
//! # Security
//!
//! This adapter validates:
//! - **Signature**: HS256 with the configured secret
//! - **Issuer (iss)**: Must match the configured issuer
//! - **Audience (aud)**: Must contain the configured audience
//! - **Expiry (exp)**: Must be in the future
//!
//! The `sub` claim carries the user id.

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::{IssuedToken, SessionValidator, TokenIssuer};

const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 3600;

/// Configuration shared by the issuer and the validator.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: SecretString,
    pub issuer: String,
    pub audience: String,
    pub access_token_ttl_secs: u64,
}

impl JwtConfig {
    pub fn new(secret: SecretString, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            secret,
            issuer: issuer.into(),
            audience: audience.into(),
            access_token_ttl_secs: DEFAULT_ACCESS_TOKEN_TTL_SECS,
        }
    }

    pub fn with_access_token_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.access_token_ttl_secs = ttl_secs;
        self
    }
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id.
    pub sub: String,
    pub iss: String,
    pub aud: String,
    /// Expiry as Unix seconds.
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Validates HS256 session tokens.
pub struct JwtSessionValidator {
    config: JwtConfig,
    decoding_key: DecodingKey,
}

impl JwtSessionValidator {
    pub fn new(config: JwtConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret.expose_secret().as_bytes());
        Self {
            config,
            decoding_key,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation
    }
}

/// Signs a session token for `user_id` valid for `ttl_secs`.
///
/// A negative lifetime yields an already expired token.
pub fn issue_token(
    config: &JwtConfig,
    user_id: &UserId,
    email: Option<String>,
    ttl_secs: i64,
) -> Result<String, AuthError> {
    let claims = SessionClaims {
        sub: user_id.to_string(),
        iss: config.issuer.clone(),
        aud: config.audience.clone(),
        exp: chrono::Utc::now().timestamp() + ttl_secs,
        email,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.expose_secret().as_bytes()),
    )
    .map_err(|e| AuthError::service_unavailable(format!("Failed to sign token: {}", e)))
}

/// Issues login tokens with the configured lifetime.
pub struct JwtTokenIssuer {
    config: JwtConfig,
}

impl JwtTokenIssuer {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, user_id: &UserId, email: Option<&str>) -> Result<IssuedToken, AuthError> {
        let ttl = self.config.access_token_ttl_secs;
        let ttl_secs = i64::try_from(ttl)
            .map_err(|_| AuthError::service_unavailable("Token lifetime out of range"))?;
        let access_token = issue_token(&self.config, user_id, email.map(str::to_string), ttl_secs)?;
        Ok(IssuedToken {
            access_token,
            expires_in: ttl,
        })
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("Token expired");
                        AuthError::TokenExpired
                    }
                    ErrorKind::InvalidIssuer => {
                        tracing::warn!("Invalid issuer in token");
                        AuthError::InvalidToken
                    }
                    ErrorKind::InvalidAudience => {
                        tracing::warn!("Invalid audience in token");
                        AuthError::InvalidToken
                    }
                    _ => {
                        tracing::debug!("Token validation failed: {}", e);
                        AuthError::InvalidToken
                    }
                }
            })?;

        let claims = token_data.claims;
        let user_id: UserId = claims.sub.parse().map_err(|_| {
            tracing::warn!(sub = %claims.sub, "Token subject is not a user id");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(user_id, claims.email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig::new(
            SecretString::new("a-test-secret-that-is-long-enough-0123".to_string()),
            "paperskill-accounts",
            "paperskill-api",
        )
    }

    #[tokio::test]
    async fn valid_token_yields_user() {
        let config = config();
        let user_id = UserId::new();
        let token = issue_token(&config, &user_id, Some("a@example.com".into()), 600).unwrap();

        let user = JwtSessionValidator::new(config).validate(&token).await.unwrap();

        assert_eq!(user.id, user_id);
        assert_eq!(user.email.as_deref(), Some("a@example.com"));
    }

    #[tokio::test]
    async fn expired_token_is_reported_as_expired() {
        let config = config();
        let token = issue_token(&config, &UserId::new(), None, -600).unwrap();

        let result = JwtSessionValidator::new(config).validate(&token).await;

        assert_eq!(result, Err(AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn wrong_audience_is_invalid() {
        let mut other = config();
        other.audience = "someone-else".to_string();
        let token = issue_token(&other, &UserId::new(), None, 600).unwrap();

        let result = JwtSessionValidator::new(config()).validate(&token).await;

        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn wrong_secret_is_invalid() {
        let mut other = config();
        other.secret = SecretString::new("another-secret-that-is-long-enough-999".to_string());
        let token = issue_token(&other, &UserId::new(), None, 600).unwrap();

        let result = JwtSessionValidator::new(config()).validate(&token).await;

        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn issued_login_token_is_accepted_by_validator() {
        let config = config().with_access_token_ttl_secs(120);
        let user_id = UserId::new();

        let issued = JwtTokenIssuer::new(config.clone())
            .issue(&user_id, Some("b@example.com"))
            .unwrap();
        let user = JwtSessionValidator::new(config)
            .validate(&issued.access_token)
            .await
            .unwrap();

        assert_eq!(issued.expires_in, 120);
        assert_eq!(user.id, user_id);
        assert_eq!(user.email.as_deref(), Some("b@example.com"));
    }

    #[tokio::test]
    async fn garbage_is_invalid() {
        let result = JwtSessionValidator::new(config()).validate("not.a.jwt").await;
        assert_eq!(result, Err(AuthError::InvalidToken));
    }
}
