//! Configuration module for the Chattingo gateway.
//!
//! Loads configuration from YAML files and environment variables.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

use crate::auth::ConfiguredUser;
use crate::error::{GatewayError, GatewayResult};

/// Longest token lifetime accepted from configuration (one year).
pub const MAX_TOKEN_DURATION_HOURS: i64 = 24 * 365;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub gate: GateSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Token issuance and validation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign and verify bearer tokens.
    pub jwt_secret: String,
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    #[serde(default = "default_token_duration")]
    pub token_duration_hours: i64,
    /// Accounts allowed to log in through `/api/auth/login`.
    #[serde(default)]
    pub users: Vec<ConfiguredUser>,
}

/// Request gate settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GateSettings {
    /// Ant-style patterns admitted without a credential, in evaluation order.
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
    /// Header required on state-changing protected requests.
    /// Absent means CSRF protection is disabled.
    #[serde(default)]
    pub csrf_header: Option<String>,
}

fn default_issuer() -> String {
    "chattingo".to_string()
}

fn default_token_duration() -> i64 {
    24
}

pub fn default_public_paths() -> Vec<String> {
    vec![
        "/actuator/**".to_string(),
        "/api/auth/**".to_string(),
        "/ws/**".to_string(),
    ]
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            public_paths: default_public_paths(),
            csrf_header: None,
        }
    }
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (CHATTINGO__*)
    /// 2. config/local.yaml (if exists)
    /// 3. config/default.yaml
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("CHATTINGO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject values that would let the service start but never admit a
    /// logged-in user.
    pub fn validate(&self) -> GatewayResult<()> {
        self.auth.validate()
    }
}

impl AuthConfig {
    pub fn validate(&self) -> GatewayResult<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(GatewayError::Config(
                "auth.jwt_secret must not be empty".to_string(),
            ));
        }
        if !(1..=MAX_TOKEN_DURATION_HOURS).contains(&self.token_duration_hours) {
            return Err(GatewayError::Config(format!(
                "auth.token_duration_hours must be between 1 and {MAX_TOKEN_DURATION_HOURS}, got {}",
                self.token_duration_hours
            )));
        }
        Ok(())
    }
}
