//! JWT token encoding and validation.
//!
//! Tokens are HMAC-signed JWTs sharing one secret for access and refresh
//! tokens. The two kinds differ only by the `refresh_token` flag in the
//! payload:
//!
//! ```text
//! access:  {"user_id": 1, "iat": ..., "exp": ..., "jti": "..."}
//! refresh: {"user_id": 1, "refresh_token": true, "iat": ..., "exp": ..., "jti": "..."}
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use tokengate_auth::token::jwt::{JwtService, SigningAlgorithm, TokenKind};
//!
//! let jwt = JwtService::new("secret", SigningAlgorithm::HS256);
//! let token = jwt.mint(&Subject::Id(1), TokenKind::Access, Duration::from_secs(3600))?;
//! let claims = jwt.decode(&token)?;
//! assert_eq!(claims.subject(), Some(&Subject::Id(1)));
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, TokenConfig};
use crate::types::Subject;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// The token could not be parsed at all.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of the parse failure.
        message: String,
    },

    /// The token signature does not verify under the configured secret and
    /// algorithm.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// The signing key was rejected.
    #[error("Invalid key: {message}")]
    InvalidKey {
        /// Description of why the key is invalid.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a new `EncodingError`.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Returns `true` for failures caused by the presented token rather than
    /// by our own keys.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::Malformed { .. } | Self::InvalidSignature | Self::Expired
        )
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            // A token signed with a different algorithm does not verify under ours.
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::InvalidSignature,
            ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidEcdsaKey | ErrorKind::InvalidKeyFormat => {
                Self::invalid_key(err.to_string())
            }
            _ => Self::malformed(err.to_string()),
        }
    }
}

// ============================================================================
// Signing Algorithm
// ============================================================================

/// Supported symmetric signing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SigningAlgorithm {
    /// HMAC with SHA-256.
    #[default]
    HS256,
    /// HMAC with SHA-384.
    HS384,
    /// HMAC with SHA-512.
    HS512,
}

impl SigningAlgorithm {
    /// Converts to the `jsonwebtoken` Algorithm type.
    #[must_use]
    pub fn to_jwt_algorithm(self) -> Algorithm {
        match self {
            Self::HS256 => Algorithm::HS256,
            Self::HS384 => Algorithm::HS384,
            Self::HS512 => Algorithm::HS512,
        }
    }

    /// Returns the algorithm name as used in JWT headers.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SigningAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HS256" => Ok(Self::HS256),
            "HS384" => Ok(Self::HS384),
            "HS512" => Ok(Self::HS512),
            other => Err(ConfigError::InvalidValue(format!(
                "Invalid token algorithm: '{}'. Must be HS256, HS384, or HS512",
                other
            ))),
        }
    }
}

// ============================================================================
// Token Claims
// ============================================================================

/// Which half of a credential pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Short-lived token authorizing API calls.
    Access,
    /// Long-lived token used only to obtain new access tokens.
    Refresh,
}

impl TokenKind {
    /// Value of the `token_type` field used in HTTP responses.
    #[must_use]
    pub fn token_type(&self) -> &'static str {
        match self {
            Self::Access => "bearer",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token_type())
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Claims carried by both access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject the token was issued to. Absent only in foreign tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Subject>,

    /// Kind flag: `true` for refresh tokens, omitted for access tokens.
    #[serde(default, skip_serializing_if = "is_false")]
    pub refresh_token: bool,

    /// Issued at (Unix timestamp).
    #[serde(default)]
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// JWT ID, unique per minted token.
    #[serde(default)]
    pub jti: String,
}

impl TokenClaims {
    /// Builds claims for `subject` issued at `issued_at` (Unix seconds) and
    /// valid for `ttl`.
    #[must_use]
    pub fn new(subject: Subject, kind: TokenKind, issued_at: i64, ttl: Duration) -> Self {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self {
            user_id: Some(subject),
            refresh_token: kind == TokenKind::Refresh,
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// The token kind, read from the `refresh_token` flag.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        if self.refresh_token {
            TokenKind::Refresh
        } else {
            TokenKind::Access
        }
    }

    /// The subject, if the token carries one.
    #[must_use]
    pub fn subject(&self) -> Option<&Subject> {
        self.user_id.as_ref()
    }

    /// Returns `true` if the token is expired at `now` (Unix seconds).
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }
}

// ============================================================================
// JWT Service
// ============================================================================

/// Service for encoding and decoding tokens.
///
/// Thread-safe (`Send + Sync`); share it behind an `Arc`.
pub struct JwtService {
    algorithm: SigningAlgorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl JwtService {
    /// Creates a service signing with `secret` and reading the system clock.
    #[must_use]
    pub fn new(secret: impl AsRef<[u8]>, algorithm: SigningAlgorithm) -> Self {
        let secret = secret.as_ref();
        Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            clock: Arc::new(SystemClock),
        }
    }

    /// Creates a service from validated token configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn from_config(config: &TokenConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            config.token_secret_key.as_bytes(),
            config.algorithm()?,
        ))
    }

    /// Replaces the time source used for `iat` and expiry checks.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Signs `claims` exactly as given.
    ///
    /// # Errors
    /// Returns an error if encoding fails.
    pub fn encode(&self, claims: &TokenClaims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm.to_jwt_algorithm());

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::encoding_error(e.to_string()))
    }

    /// Builds claims for `subject` stamped with the current time and signs them.
    ///
    /// # Errors
    /// Returns an error if encoding fails.
    pub fn mint(
        &self,
        subject: &Subject,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let claims = TokenClaims::new(subject.clone(), kind, self.clock.unix_timestamp(), ttl);
        self.encode(&claims)
    }

    /// Verifies the signature of `token`, then checks `exp > now`.
    ///
    /// A token that is both expired and foreign-signed reports
    /// `InvalidSignature`.
    ///
    /// # Errors
    /// - `InvalidSignature` if the signature does not verify
    /// - `Expired` if `exp <= now`
    /// - `Malformed` if the token cannot be parsed
    pub fn decode(&self, token: &str) -> Result<TokenClaims, JwtError> {
        let mut validation = Validation::new(self.algorithm.to_jwt_algorithm());
        // Expiry is checked against the injected clock below, without leeway.
        validation.validate_exp = false;
        validation.validate_aud = false;

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(JwtError::from)?
            .claims;

        if claims.is_expired_at(self.clock.unix_timestamp()) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }

    /// Returns the configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }
}

impl fmt::Debug for JwtService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtService")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
