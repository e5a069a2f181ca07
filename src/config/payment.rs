//! Payment configuration

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;
use crate::adapters::stripe::StripeConfig;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe API key
    pub stripe_api_key: SecretString,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: SecretString,

    /// ISO currency code prices are created in
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Externally reachable base URL used for checkout redirects
    pub public_base_url: String,

    #[serde(default = "default_stripe_api_base_url")]
    pub stripe_api_base_url: String,

    /// Reject test-mode webhook events
    #[serde(default)]
    pub require_livemode: bool,

    /// Maximum webhook signature age in seconds
    #[serde(default = "default_webhook_tolerance")]
    pub webhook_tolerance_secs: i64,

    /// Timeout for each Stripe API call in seconds
    #[serde(default = "default_gateway_timeout")]
    pub gateway_timeout_secs: u64,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_live_")
    }

    /// Build the immutable gateway configuration.
    pub fn stripe_config(&self) -> StripeConfig {
        StripeConfig::new(
            self.stripe_api_key.clone(),
            self.stripe_webhook_secret.clone(),
        )
        .with_base_url(self.stripe_api_base_url.clone())
        .with_currency(self.currency.clone())
        .with_require_livemode(self.require_livemode)
        .with_webhook_tolerance_secs(self.webhook_tolerance_secs)
        .with_request_timeout(Duration::from_secs(self.gateway_timeout_secs))
    }

    /// Validate payment configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let api_key = self.stripe_api_key.expose_secret();
        let webhook_secret = self.stripe_webhook_secret.expose_secret();

        if api_key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_API_KEY"));
        }
        if webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_WEBHOOK_SECRET"));
        }
        if self.public_base_url.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__PUBLIC_BASE_URL"));
        }

        // Verify key prefixes for safety
        if !api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }

        if self.currency.len() != 3 || !self.currency.bytes().all(|b| b.is_ascii_lowercase()) {
            return Err(ValidationError::InvalidCurrency);
        }

        let is_https = self.public_base_url.starts_with("https://");
        if !is_https && !self.public_base_url.starts_with("http://") {
            return Err(ValidationError::InvalidPublicBaseUrl);
        }
        if *environment == Environment::Production && !is_https {
            return Err(ValidationError::PublicBaseUrlMustBeHttps);
        }

        if self.webhook_tolerance_secs <= 0 {
            return Err(ValidationError::InvalidWebhookTolerance);
        }
        if self.gateway_timeout_secs == 0 || self.gateway_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }

        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: SecretString::new(String::new()),
            stripe_webhook_secret: SecretString::new(String::new()),
            currency: default_currency(),
            public_base_url: String::new(),
            stripe_api_base_url: default_stripe_api_base_url(),
            require_livemode: false,
            webhook_tolerance_secs: default_webhook_tolerance(),
            gateway_timeout_secs: default_gateway_timeout(),
        }
    }
}

fn default_currency() -> String {
    "rub".to_string()
}

fn default_stripe_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_webhook_tolerance() -> i64 {
    300
}

fn default_gateway_timeout() -> u64 {
    10
}
