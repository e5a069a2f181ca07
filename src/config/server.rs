//! HTTP listener, logging and browser-origin settings.

use std::net::SocketAddr;
use std::time::Duration;

use http::HeaderValue;
use serde::Deserialize;

use super::error::ValidationError;

const MAX_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub environment: Environment,

    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// JSON log lines; unset means JSON in production only
    #[serde(default)]
    pub log_json: Option<bool>,

    /// Upper bound for a whole request, including the Stripe round trip
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Comma-separated browser origins, e.g. `https://paperskill.example`.
    /// Empty allows any origin.
    #[serde(default)]
    pub cors_origins: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ValidationError::InvalidHost)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn json_logs(&self) -> bool {
        self.log_json.unwrap_or_else(|| self.is_production())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parsed CORS origins. Each must be an `http(s)://` origin usable as a header value.
    pub fn allowed_origins(&self) -> Result<Vec<HeaderValue>, ValidationError> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                let scheme_ok = origin.starts_with("https://") || origin.starts_with("http://");
                match HeaderValue::from_str(origin) {
                    Ok(value) if scheme_ok && !origin.ends_with('/') => Ok(value),
                    _ => Err(ValidationError::InvalidCorsOrigin(origin.to_string())),
                }
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        self.socket_addr()?;
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        self.allowed_origins()?;
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            log_filter: default_log_filter(),
            log_json: None,
            request_timeout_secs: default_request_timeout(),
            cors_origins: String::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_filter() -> String {
    "info,paperskill=debug,tower_http=info,sqlx=warn".to_string()
}

fn default_request_timeout() -> u64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_logs_follow_environment_unless_set() {
        let mut config = ServerConfig::default();
        assert!(!config.json_logs());

        config.environment = Environment::Production;
        assert!(config.json_logs());

        config.log_json = Some(false);
        assert!(!config.json_logs());
    }

    #[test]
    fn unparseable_host_is_rejected() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidHost));
        assert_eq!(
            ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                ..Default::default()
            }
            .socket_addr()
            .unwrap()
            .to_string(),
            "127.0.0.1:3000"
        );
    }

    #[test]
    fn request_timeout_must_be_bounded() {
        for secs in [0, MAX_REQUEST_TIMEOUT_SECS + 1] {
            let config = ServerConfig {
                request_timeout_secs: secs,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
        }
    }

    #[test]
    fn origins_are_trimmed_and_empty_entries_skipped() {
        let config = ServerConfig {
            cors_origins: " http://localhost:5173, ,https://paperskill.example ".to_string(),
            ..Default::default()
        };
        let origins = config.allowed_origins().unwrap();
        assert_eq!(
            origins,
            vec![
                HeaderValue::from_static("http://localhost:5173"),
                HeaderValue::from_static("https://paperskill.example"),
            ]
        );
        assert!(ServerConfig::default().allowed_origins().unwrap().is_empty());
    }

    #[test]
    fn origin_with_path_or_without_scheme_is_rejected() {
        for bad in ["paperskill.example", "https://paperskill.example/"] {
            let config = ServerConfig {
                cors_origins: bad.to_string(),
                ..Default::default()
            };
            assert_eq!(
                config.validate(),
                Err(ValidationError::InvalidCorsOrigin(bad.to_string()))
            );
        }
    }
}
