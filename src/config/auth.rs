//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;
use crate::adapters::auth::JwtConfig;

/// Minimum HS256 secret length accepted in production.
pub const MIN_PRODUCTION_SECRET_BYTES: usize = 32;

const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Authentication configuration (HS256 session tokens)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret session tokens are signed and checked with
    pub jwt_secret: SecretString,

    /// Expected `iss` claim
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,

    /// Expected `aud` claim
    #[serde(default = "default_audience")]
    pub jwt_audience: String,

    /// Lifetime of tokens issued at login
    #[serde(default = "default_token_ttl")]
    pub access_token_ttl_secs: u64,
}

impl AuthConfig {
    /// Build the signing and validation configuration.
    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::new(
            self.jwt_secret.clone(),
            self.jwt_issuer.clone(),
            self.jwt_audience.clone(),
        )
        .with_access_token_ttl_secs(self.access_token_ttl_secs)
    }

    /// Validate authentication configuration
    ///
    /// Short secrets are tolerated outside production.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret_len = self.jwt_secret.expose_secret().len();
        if secret_len == 0 {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if self.jwt_issuer.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_ISSUER"));
        }
        if self.jwt_audience.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_AUDIENCE"));
        }
        if !(60..=MAX_TOKEN_TTL_SECS).contains(&self.access_token_ttl_secs) {
            return Err(ValidationError::InvalidTokenTtl);
        }

        if *environment == Environment::Production && secret_len < MIN_PRODUCTION_SECRET_BYTES {
            return Err(ValidationError::JwtSecretTooShort(MIN_PRODUCTION_SECRET_BYTES));
        }

        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::new(String::new()),
            jwt_issuer: default_issuer(),
            jwt_audience: default_audience(),
            access_token_ttl_secs: default_token_ttl(),
        }
    }
}

fn default_issuer() -> String {
    "paperskill-accounts".to_string()
}

fn default_audience() -> String {
    "paperskill-api".to_string()
}

fn default_token_ttl() -> u64 {
    3600
}
