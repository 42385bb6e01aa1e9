//! Request and response bodies.

use serde::{Deserialize, Serialize};

use crate::token::issuer::TokenPair;
use crate::token::jwt::TokenKind;

fn default_token_type() -> String {
    TokenKind::Access.token_type().to_string()
}

/// A token together with its type tag.
///
/// Used both in login/refresh responses and as the body of refresh and
/// logout requests, where `access_token` carries the refresh token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// Encoded token.
    pub access_token: String,

    /// `"bearer"` or `"refresh"`.
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

impl Token {
    /// Wraps `token` with the type tag of `kind`.
    #[must_use]
    pub fn new(token: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            access_token: token.into(),
            token_type: kind.token_type().to_string(),
        }
    }
}

/// Response body of login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    /// Access token.
    pub bearer: Token,
    /// Refresh token.
    pub refresh: Token,
}

impl From<TokenPair> for AuthResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            bearer: Token::new(pair.access_token, TokenKind::Access),
            refresh: Token::new(pair.refresh_token, TokenKind::Refresh),
        }
    }
}

/// Login request body.
#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    /// Login email address.
    pub email: String,
    /// Login password.
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Body returned by logout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    /// HTTP status code mirrored in the body.
    pub status: u16,
}

impl StatusResponse {
    /// `{"status": 200}`.
    #[must_use]
    pub fn ok() -> Self {
        Self { status: 200 }
    }
}
