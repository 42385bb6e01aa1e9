//! Credential pair issuance.

use std::sync::Arc;
use std::time::Duration;

use crate::AuthResult;
use crate::config::TokenConfig;
use crate::error::AuthError;
use crate::token::jwt::{JwtService, TokenKind};
use crate::types::Subject;

/// An access token and a refresh token issued together for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Short-lived bearer token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
}

/// Mints credential pairs with the configured lifetimes.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    jwt_service: Arc<JwtService>,
    access_token_lifetime: Duration,
    refresh_token_lifetime: Duration,
}

impl TokenIssuer {
    /// Creates an issuer.
    ///
    /// The refresh lifetime is expected to be at least the access lifetime;
    /// [`TokenConfig::validate`] enforces that for configured issuers.
    #[must_use]
    pub fn new(
        jwt_service: Arc<JwtService>,
        access_token_lifetime: Duration,
        refresh_token_lifetime: Duration,
    ) -> Self {
        Self {
            jwt_service,
            access_token_lifetime,
            refresh_token_lifetime,
        }
    }

    /// Creates an issuer using the lifetimes from `config`.
    #[must_use]
    pub fn from_config(jwt_service: Arc<JwtService>, config: &TokenConfig) -> Self {
        Self::new(
            jwt_service,
            config.access_token_lifetime(),
            config.refresh_token_lifetime(),
        )
    }

    /// Issues a fresh access + refresh pair for `subject`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if token encoding fails.
    pub fn issue(&self, subject: &Subject) -> AuthResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access(subject)?,
            refresh_token: self.mint(subject, TokenKind::Refresh, self.refresh_token_lifetime)?,
        })
    }

    /// Issues a single access token for `subject`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if token encoding fails.
    pub fn issue_access(&self, subject: &Subject) -> AuthResult<String> {
        self.mint(subject, TokenKind::Access, self.access_token_lifetime)
    }

    /// Access token lifetime.
    #[must_use]
    pub fn access_token_lifetime(&self) -> Duration {
        self.access_token_lifetime
    }

    /// Refresh token lifetime.
    #[must_use]
    pub fn refresh_token_lifetime(&self) -> Duration {
        self.refresh_token_lifetime
    }

    fn mint(&self, subject: &Subject, kind: TokenKind, ttl: Duration) -> AuthResult<String> {
        self.jwt_service.mint(subject, kind, ttl).map_err(|e| {
            tracing::error!(error = %e, kind = %kind, "Failed to mint token");
            AuthError::internal(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::token::jwt::SigningAlgorithm;

    fn issuer() -> (TokenIssuer, Arc<JwtService>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let jwt = Arc::new(
            JwtService::new("issuer-test-secret", SigningAlgorithm::HS256)
                .with_clock(clock.clone()),
        );
        let issuer = TokenIssuer::new(
            jwt.clone(),
            Duration::from_secs(60 * 60),
            Duration::from_secs(30 * 24 * 60 * 60),
        );
        (issuer, jwt, clock)
    }

    #[test]
    fn test_issue_pair_shares_subject() {
        let (issuer, jwt, clock) = issuer();
        let pair = issuer.issue(&Subject::Id(1)).unwrap();

        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());
        assert_ne!(pair.access_token, pair.refresh_token);

        let access = jwt.decode(&pair.access_token).unwrap();
        let refresh = jwt.decode(&pair.refresh_token).unwrap();

        assert_eq!(access.kind(), TokenKind::Access);
        assert_eq!(refresh.kind(), TokenKind::Refresh);
        assert_eq!(access.subject(), Some(&Subject::Id(1)));
        assert_eq!(refresh.subject(), Some(&Subject::Id(1)));

        let now = clock.unix_timestamp();
        assert_eq!(access.exp, now + 3600);
        assert_eq!(refresh.exp, now + 30 * 24 * 3600);
    }

    #[test]
    fn test_access_expires_before_refresh() {
        let (issuer, jwt, clock) = issuer();
        let pair = issuer.issue(&Subject::from("alice")).unwrap();

        clock.advance(Duration::from_secs(3600));
        assert!(jwt.decode(&pair.access_token).is_err());
        assert!(jwt.decode(&pair.refresh_token).is_ok());
    }

    #[test]
    fn test_from_config_lifetimes() {
        let (_, jwt, _) = issuer();
        let config = TokenConfig {
            token_expire_minutes: 5,
            refresh_token_expire_minutes: 10,
            ..TokenConfig::with_secret("x")
        };
        let issuer = TokenIssuer::from_config(jwt, &config);
        assert_eq!(issuer.access_token_lifetime(), Duration::from_secs(300));
        assert_eq!(issuer.refresh_token_lifetime(), Duration::from_secs(600));
    }
}
