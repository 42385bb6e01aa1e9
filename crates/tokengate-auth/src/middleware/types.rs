//! Request-scoped authentication context.

use std::sync::Arc;

use crate::token::jwt::TokenClaims;
use crate::types::Subject;

/// Identity attached to a request that passed the authenticator.
///
/// Lives in the request extensions for the duration of one request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Subject of the validated access token.
    pub subject: Subject,

    /// Decoded access token claims.
    pub claims: Arc<TokenClaims>,
}

impl AuthContext {
    /// Builds a context from decoded access token claims.
    ///
    /// Returns `None` if the claims carry no subject.
    #[must_use]
    pub fn from_claims(claims: TokenClaims) -> Option<Self> {
        let subject = claims.user_id.clone()?;
        Some(Self {
            subject,
            claims: Arc::new(claims),
        })
    }

    /// Token identifier of the access token used for this request.
    #[must_use]
    pub fn jti(&self) -> &str {
        &self.claims.jti
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::token::jwt::TokenKind;

    #[test]
    fn test_context_requires_subject() {
        let mut claims = TokenClaims::new(Subject::Id(7), TokenKind::Access, 0, Duration::from_secs(60));
        let ctx = AuthContext::from_claims(claims.clone()).unwrap();
        assert_eq!(ctx.subject, Subject::Id(7));
        assert_eq!(ctx.jti(), claims.jti);

        claims.user_id = None;
        assert!(AuthContext::from_claims(claims).is_none());
    }
}
