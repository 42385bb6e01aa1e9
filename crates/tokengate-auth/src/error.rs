//! Authentication error types.
//!
//! Codec-level failures live in [`crate::token::jwt::JwtError`]; they are
//! folded into the variants below at the middleware and refresh boundaries so
//! that callers only ever see the umbrella 401 class for bad tokens.

use std::fmt;

use axum::http::StatusCode;

use crate::token::jwt::JwtError;

/// Errors that can occur while authenticating requests or managing tokens.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request lacks valid authentication credentials.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Description of why the request is unauthorized.
        message: String,
    },

    /// The presented token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// The presented refresh token is in the revocation cache.
    #[error("Token revoked")]
    TokenRevoked,

    /// The refresh token belongs to a different subject than the bearer token.
    #[error("Token mismatch")]
    TokenMismatch,

    /// A token of the wrong kind was presented (e.g. an access token where a
    /// refresh token is expected).
    #[error("Invalid token type")]
    InvalidTokenType,

    /// Login credentials did not match any known user.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The request body could not be understood.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// An error occurred while reading or writing auth state.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `Unauthorized` error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP status code this error maps to.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized { .. }
            | Self::TokenExpired
            | Self::TokenRevoked
            | Self::TokenMismatch => StatusCode::UNAUTHORIZED,
            Self::InvalidTokenType | Self::InvalidCredentials => StatusCode::BAD_REQUEST,
            Self::InvalidRequest { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns `true` if this error belongs to the 401 umbrella class.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == StatusCode::UNAUTHORIZED
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Human-readable text placed in the `detail` field of error responses.
    ///
    /// Server-side failures return a generic message; their specifics are
    /// only logged.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Unauthorized { message } => message.clone(),
            Self::TokenExpired => "Token has expired".to_string(),
            Self::TokenRevoked => "Could not validate credentials".to_string(),
            Self::TokenMismatch => {
                "Invalid refresh token for user, one of these tokens might have been stolen"
                    .to_string()
            }
            Self::InvalidTokenType => "Invalid token type".to_string(),
            Self::InvalidCredentials => "Invalid credentials or user not found".to_string(),
            Self::InvalidRequest { message } => message.clone(),
            Self::Storage { .. } | Self::Internal { .. } => {
                "Internal server error".to_string()
            }
        }
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Unauthorized { .. } => ErrorCategory::Authentication,
            Self::TokenExpired | Self::TokenRevoked | Self::InvalidTokenType => {
                ErrorCategory::Token
            }
            Self::TokenMismatch => ErrorCategory::Theft,
            Self::InvalidCredentials => ErrorCategory::Authentication,
            Self::InvalidRequest { .. } => ErrorCategory::Validation,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Folds codec failures into the 401 class. Key and encoding failures are
/// ours, not the caller's, and become internal errors.
impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::TokenExpired,
            JwtError::Malformed { .. } | JwtError::InvalidSignature => {
                Self::unauthorized("Could not validate credentials")
            }
            JwtError::EncodingError { .. } | JwtError::InvalidKey { .. } => {
                Self::internal(err.to_string())
            }
        }
    }
}

/// Categories of authentication errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Identity verification failed.
    Authentication,
    /// Token validation failed (expiry, revocation, kind).
    Token,
    /// A refresh token was presented by a subject it was not issued to.
    Theft,
    /// Request validation errors.
    Validation,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Token => write!(f, "token"),
            Self::Theft => write!(f, "theft"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::unauthorized("missing header");
        assert_eq!(err.to_string(), "Unauthorized: missing header");

        assert_eq!(AuthError::TokenExpired.to_string(), "Token expired");
        assert_eq!(AuthError::InvalidTokenType.to_string(), "Invalid token type");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::unauthorized("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::TokenRevoked.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::TokenMismatch.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::InvalidTokenType.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::invalid_request("bad json").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AuthError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_predicates() {
        assert!(AuthError::TokenExpired.is_unauthorized());
        assert!(AuthError::TokenExpired.is_client_error());
        assert!(!AuthError::InvalidTokenType.is_unauthorized());

        let err = AuthError::storage("lock poisoned");
        assert!(!err.is_client_error());
        assert!(err.is_server_error());
    }

    #[test]
    fn test_server_error_detail_is_generic() {
        let err = AuthError::internal("signing key rejected by backend");
        assert_eq!(err.detail(), "Internal server error");
    }

    #[test]
    fn test_codec_errors_become_unauthorized() {
        assert!(matches!(
            AuthError::from(JwtError::Expired),
            AuthError::TokenExpired
        ));
        for err in [JwtError::InvalidSignature, JwtError::malformed("bad base64")] {
            let err = AuthError::from(err);
            assert!(err.is_unauthorized());
            assert_eq!(err.detail(), "Could not validate credentials");
        }
        assert!(AuthError::from(JwtError::encoding_error("x")).is_server_error());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            AuthError::unauthorized("x").category(),
            ErrorCategory::Authentication
        );
        assert_eq!(AuthError::TokenMismatch.category(), ErrorCategory::Theft);
        assert_eq!(
            AuthError::storage("x").category(),
            ErrorCategory::Infrastructure
        );
        assert_eq!(ErrorCategory::Theft.to_string(), "theft");
    }
}
