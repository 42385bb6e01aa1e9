//! Refresh and logout protocol.
//!
//! Both operations run after the request authenticator has accepted an
//! access token, and compare that token's subject with the subject embedded
//! in the presented refresh token.
//!
//! # Refresh
//!
//! 1. Reject tokens already in the revocation cache.
//! 2. Decode the refresh token.
//! 3. Require its subject to match the authenticated subject.
//! 4. Require it to be a refresh token.
//! 5. With rotation on, consume it and issue a new pair; otherwise issue a
//!    new access token and hand the same refresh token back.
//!
//! # Logout
//!
//! 1. Decode the refresh token.
//! 2. Require it to be a refresh token.
//! 3. On subject mismatch revoke it anyway and fail (theft signal).
//! 4. Otherwise revoke it.

use std::sync::Arc;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::RevokedTokenStorage;
use crate::token::issuer::{TokenIssuer, TokenPair};
use crate::token::jwt::{JwtService, TokenClaims, TokenKind};
use crate::types::Subject;

/// Validates presented refresh tokens, rotates them, and maintains the
/// revocation cache.
#[derive(Clone)]
pub struct RefreshProtocol {
    jwt_service: Arc<JwtService>,
    issuer: Arc<TokenIssuer>,
    revoked_tokens: Arc<dyn RevokedTokenStorage>,
    rotate_refresh_tokens: bool,
}

impl RefreshProtocol {
    /// Creates a protocol instance.
    pub fn new(
        jwt_service: Arc<JwtService>,
        issuer: Arc<TokenIssuer>,
        revoked_tokens: Arc<dyn RevokedTokenStorage>,
        rotate_refresh_tokens: bool,
    ) -> Self {
        Self {
            jwt_service,
            issuer,
            revoked_tokens,
            rotate_refresh_tokens,
        }
    }

    /// Exchanges `refresh_token` for new credentials on behalf of `caller`.
    ///
    /// # Errors
    ///
    /// - `TokenRevoked` if the token was revoked or consumed concurrently
    /// - `TokenExpired` / `Unauthorized` if it does not decode
    /// - `Unauthorized` if its subject is not `caller`
    /// - `InvalidTokenType` if it is an access token
    pub async fn refresh(&self, caller: &Subject, refresh_token: &str) -> AuthResult<TokenPair> {
        if self.revoked_tokens.is_revoked(refresh_token).await? {
            tracing::warn!(
                target: "tokengate::audit",
                subject = %caller,
                "Revoked refresh token presented"
            );
            return Err(AuthError::TokenRevoked);
        }

        let claims = self.decode(refresh_token)?;

        let subject = match claims.subject() {
            Some(subject) if subject == caller => subject,
            other => {
                tracing::debug!(
                    subject = %caller,
                    token_subject = ?other,
                    "Refresh token subject does not match bearer"
                );
                return Err(AuthError::unauthorized("Could not validate credentials"));
            }
        };

        if claims.kind() != TokenKind::Refresh {
            return Err(AuthError::InvalidTokenType);
        }

        if !self.rotate_refresh_tokens {
            let access_token = self.issuer.issue_access(subject)?;
            tracing::debug!(subject = %subject, "Access token refreshed");
            return Ok(TokenPair {
                access_token,
                refresh_token: refresh_token.to_string(),
            });
        }

        let pair = self.issuer.issue(subject)?;

        // Consume the old token; only one concurrent refresh may win.
        if !self.revoked_tokens.revoke(refresh_token).await? {
            tracing::warn!(
                target: "tokengate::audit",
                subject = %subject,
                jti = %claims.jti,
                "Refresh token reused concurrently"
            );
            return Err(AuthError::TokenRevoked);
        }

        tracing::info!(subject = %subject, jti = %claims.jti, "Refresh token rotated");
        Ok(pair)
    }

    /// Revokes `refresh_token` on behalf of `caller` (logout).
    ///
    /// # Errors
    ///
    /// - `TokenExpired` / `Unauthorized` if it does not decode
    /// - `InvalidTokenType` if it is an access token
    /// - `TokenMismatch` if it belongs to another subject; the token is
    ///   revoked before the error is returned
    pub async fn revoke(&self, caller: &Subject, refresh_token: &str) -> AuthResult<()> {
        let claims = self.decode(refresh_token)?;

        if claims.kind() != TokenKind::Refresh {
            return Err(AuthError::InvalidTokenType);
        }

        if claims.subject() != Some(caller) {
            self.revoked_tokens.revoke(refresh_token).await?;
            tracing::warn!(
                target: "tokengate::audit",
                subject = %caller,
                token_subject = ?claims.subject(),
                jti = %claims.jti,
                "Refresh token presented by another subject, revoked"
            );
            return Err(AuthError::TokenMismatch);
        }

        let newly_revoked = self.revoked_tokens.revoke(refresh_token).await?;
        tracing::info!(subject = %caller, newly_revoked, "Refresh token revoked");
        Ok(())
    }

    fn decode(&self, token: &str) -> AuthResult<TokenClaims> {
        self.jwt_service.decode(token).map_err(|e| {
            tracing::debug!(error = %e, "Failed to decode refresh token");
            AuthError::from(e)
        })
    }
}
