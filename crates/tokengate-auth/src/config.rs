//! Token configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth]
//! token_secret_key = "change-me"
//! token_algorithm = "HS256"
//! token_expire_minutes = 60
//! refresh_token_expire_minutes = 43200
//! rotate_refresh_tokens = true
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::token::jwt::SigningAlgorithm;

/// Settings for signing and expiring tokens.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Shared HMAC secret. Required; there is no usable default.
    pub token_secret_key: String,

    /// Signing algorithm name (`HS256`, `HS384` or `HS512`).
    pub token_algorithm: String,

    /// Access token lifetime in minutes.
    pub token_expire_minutes: u64,

    /// Refresh token lifetime in minutes.
    pub refresh_token_expire_minutes: u64,

    /// Issue a new refresh token on every refresh and revoke the old one.
    /// When disabled the presented refresh token is handed back unchanged.
    pub rotate_refresh_tokens: bool,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            token_secret_key: String::new(),
            token_algorithm: "HS256".to_string(),
            token_expire_minutes: 60,
            refresh_token_expire_minutes: 43_200, // 30 days
            rotate_refresh_tokens: true,
        }
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("token_secret_key", &"<redacted>")
            .field("token_algorithm", &self.token_algorithm)
            .field("token_expire_minutes", &self.token_expire_minutes)
            .field(
                "refresh_token_expire_minutes",
                &self.refresh_token_expire_minutes,
            )
            .field("rotate_refresh_tokens", &self.rotate_refresh_tokens)
            .finish()
    }
}

impl TokenConfig {
    /// Creates a config with the given secret and default everything else.
    #[must_use]
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            token_secret_key: secret.into(),
            ..Self::default()
        }
    }

    /// Access token lifetime.
    #[must_use]
    pub fn access_token_lifetime(&self) -> Duration {
        Duration::from_secs(self.token_expire_minutes.saturating_mul(60))
    }

    /// Refresh token lifetime.
    #[must_use]
    pub fn refresh_token_lifetime(&self) -> Duration {
        Duration::from_secs(self.refresh_token_expire_minutes.saturating_mul(60))
    }

    /// Parses the configured signing algorithm.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for anything but HS256/HS384/HS512.
    pub fn algorithm(&self) -> Result<SigningAlgorithm, ConfigError> {
        self.token_algorithm.parse()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the secret is empty
    /// - the algorithm is not supported
    /// - either lifetime is zero
    /// - the refresh lifetime is shorter than the access lifetime
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_secret_key.is_empty() {
            return Err(ConfigError::Missing("token_secret_key".to_string()));
        }

        self.algorithm()?;

        if self.token_expire_minutes == 0 {
            return Err(ConfigError::InvalidValue(
                "token_expire_minutes must be > 0".to_string(),
            ));
        }
        if self.refresh_token_expire_minutes == 0 {
            return Err(ConfigError::InvalidValue(
                "refresh_token_expire_minutes must be > 0".to_string(),
            ));
        }
        if self.refresh_token_expire_minutes < self.token_expire_minutes {
            return Err(ConfigError::InvalidValue(
                "refresh_token_expire_minutes must be >= token_expire_minutes".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}
