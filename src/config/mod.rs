//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PAPERSKILL` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use paperskill::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}:{}", config.server.host, config.server.port);
//! ```

mod auth;
mod database;
mod error;
mod payment;
mod server;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Session token validation
    pub auth: AuthConfig,

    /// Payment processor configuration (Stripe)
    pub payment: PaymentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PAPERSKILL` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PAPERSKILL__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PAPERSKILL__PAYMENT__STRIPE_API_KEY=...` -> `payment.stripe_api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PAPERSKILL")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.payment.validate(&self.server.environment)?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const MINIMAL_ENV: &[(&str, &str)] = &[
        ("PAPERSKILL__DATABASE__URL", "postgresql://test@localhost/test"),
        ("PAPERSKILL__AUTH__JWT_SECRET", "0123456789abcdef0123456789abcdef"),
        ("PAPERSKILL__PAYMENT__STRIPE_API_KEY", "sk_test_xxx"),
        ("PAPERSKILL__PAYMENT__STRIPE_WEBHOOK_SECRET", "whsec_xxx"),
        ("PAPERSKILL__PAYMENT__PUBLIC_BASE_URL", "https://paperskill.example"),
    ];

    const OPTIONAL_VARS: &[&str] = &[
        "PAPERSKILL__SERVER__PORT",
        "PAPERSKILL__SERVER__ENVIRONMENT",
        "PAPERSKILL__PAYMENT__CURRENCY",
    ];

    /// Helper to set environment variables for testing
    fn set_minimal_env() {
        for (key, value) in MINIMAL_ENV {
            env::set_var(key, value);
        }
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for (key, _) in MINIMAL_ENV {
            env::remove_var(key);
        }
        for key in OPTIONAL_VARS {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.database.url(), "postgresql://test@localhost/test");
        assert_eq!(config.payment.public_base_url, "https://paperskill.example");
        assert_eq!(config.payment.currency, "rub");
    }

    #[test]
    fn test_validate_full_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("PAPERSKILL__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_custom_server_port_and_currency() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("PAPERSKILL__SERVER__PORT", "3000");
        env::set_var("PAPERSKILL__PAYMENT__CURRENCY", "usd");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.payment.currency, "usd");
    }

    #[test]
    fn test_missing_database_section_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::remove_var("PAPERSKILL__DATABASE__URL");
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_err());
    }
}
