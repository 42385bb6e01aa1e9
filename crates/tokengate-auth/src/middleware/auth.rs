//! Bearer token authentication.
//!
//! [`authentication_middleware`] runs in front of every route. It lets
//! `POST /auth` (login) through untouched and requires a valid access token
//! everywhere else:
//!
//! 1. Extract `Authorization: Bearer <token>` (scheme is case-insensitive)
//! 2. Decode and verify the token (signature, then expiry)
//! 3. Require a subject and the access kind
//! 4. Store an [`AuthContext`] in the request extensions
//!
//! Every rejection is a 401; decode failures never surface as 500.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{Method, Request, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, TokenConfig};
use crate::error::AuthError;
use crate::storage::{RevokedTokenStorage, UserStorage};
use crate::token::issuer::TokenIssuer;
use crate::token::jwt::{JwtService, TokenKind};
use crate::token::refresh::RefreshProtocol;

use super::types::AuthContext;

// =============================================================================
// Auth State
// =============================================================================

/// Shared state for the authenticator and the auth handlers.
#[derive(Clone)]
pub struct AuthState {
    /// Token codec.
    pub jwt_service: Arc<JwtService>,

    /// Credential pair issuer.
    pub issuer: Arc<TokenIssuer>,

    /// Refresh and logout protocol.
    pub refresh_protocol: Arc<RefreshProtocol>,

    /// Credential lookup for login.
    pub user_storage: Arc<dyn UserStorage>,
}

impl AuthState {
    /// Builds the auth state from token configuration using the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the token configuration is invalid.
    pub fn new(
        config: &TokenConfig,
        user_storage: Arc<dyn UserStorage>,
        revoked_token_storage: Arc<dyn RevokedTokenStorage>,
    ) -> Result<Self, ConfigError> {
        Self::with_clock(
            config,
            Arc::new(SystemClock),
            user_storage,
            revoked_token_storage,
        )
    }

    /// Builds the auth state with an explicit time source.
    ///
    /// # Errors
    ///
    /// Returns an error if the token configuration is invalid.
    pub fn with_clock(
        config: &TokenConfig,
        clock: Arc<dyn Clock>,
        user_storage: Arc<dyn UserStorage>,
        revoked_token_storage: Arc<dyn RevokedTokenStorage>,
    ) -> Result<Self, ConfigError> {
        let jwt_service = Arc::new(JwtService::from_config(config)?.with_clock(clock));
        let issuer = Arc::new(TokenIssuer::from_config(jwt_service.clone(), config));
        let refresh_protocol = Arc::new(RefreshProtocol::new(
            jwt_service.clone(),
            issuer.clone(),
            revoked_token_storage,
            config.rotate_refresh_tokens,
        ));

        Ok(Self {
            jwt_service,
            issuer,
            refresh_protocol,
            user_storage,
        })
    }
}

// =============================================================================
// Middleware
// =============================================================================

/// Authentication middleware for axum's `from_fn_with_state`.
pub async fn authentication_middleware(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if should_skip_authentication(&req) {
        return next.run(req).await;
    }

    let token = match bearer_token(&req) {
        Ok(token) => token,
        Err(e) => {
            tracing::debug!(path = %req.uri().path(), error = %e, "Rejected request");
            return e.into_response();
        }
    };

    match validate_token(&state, token) {
        Ok(auth_context) => {
            tracing::debug!(
                subject = %auth_context.subject,
                jti = %auth_context.jti(),
                "Token validated successfully"
            );
            req.extensions_mut().insert(auth_context);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(path = %req.uri().path(), error = %e, "Token validation failed");
            e.into_response()
        }
    }
}

/// Only login is reachable without a token.
fn should_skip_authentication(req: &Request<Body>) -> bool {
    req.method() == Method::POST && req.uri().path() == "/auth"
}

fn bearer_token(req: &Request<Body>) -> Result<&str, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AuthError::unauthorized("Not authenticated"))?
        .to_str()
        .map_err(|_| AuthError::unauthorized("Invalid Authorization header"))?;

    let token = match header.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("bearer ") => header[7..].trim(),
        _ => return Err(AuthError::unauthorized("Invalid authentication scheme")),
    };

    if token.is_empty() {
        return Err(AuthError::unauthorized("Empty Bearer token"));
    }

    Ok(token)
}

fn validate_token(state: &AuthState, token: &str) -> Result<AuthContext, AuthError> {
    let claims = state.jwt_service.decode(token)?;

    if claims.kind() != TokenKind::Access {
        return Err(AuthError::unauthorized("Could not validate credentials"));
    }

    AuthContext::from_claims(claims)
        .ok_or_else(|| AuthError::unauthorized("Could not validate credentials"))
}

// =============================================================================
// Extractor
// =============================================================================

/// Extractor for the identity stored by [`authentication_middleware`].
///
/// Rejects with 401 if the route is not behind the authenticator.
pub struct Authenticated(pub AuthContext);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(Authenticated)
            .ok_or_else(|| AuthError::unauthorized("Not authenticated"))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        Router,
        body::to_bytes,
        http::{StatusCode, header},
        middleware::from_fn_with_state,
        routing::{get, post},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::{InMemoryRevokedTokenStorage, InMemoryUserStorage};
    use crate::token::jwt::{SigningAlgorithm, TokenClaims};
    use crate::types::Subject;

    const SECRET: &str = "middleware-test-secret";

    fn state(clock: Arc<ManualClock>) -> AuthState {
        AuthState::with_clock(
            &TokenConfig::with_secret(SECRET),
            clock,
            Arc::new(InMemoryUserStorage::default()),
            Arc::new(InMemoryRevokedTokenStorage::new()),
        )
        .unwrap()
    }

    async fn whoami(Authenticated(auth): Authenticated) -> String {
        auth.subject.to_string()
    }

    fn app(state: AuthState) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route("/auth", post(|| async { "login" }))
            .layer(from_fn_with_state(state, authentication_middleware))
    }

    fn request(method: Method, uri: &str, authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_valid_access_token_passes() {
        let clock = Arc::new(ManualClock::starting_now());
        let state = state(clock);
        let pair = state.issuer.issue(&Subject::Id(42)).unwrap();

        let auth = format!("Bearer {}", pair.access_token);
        let response = app(state)
            .oneshot(request(Method::GET, "/whoami", Some(&auth)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "42");
    }

    #[tokio::test]
    async fn test_scheme_is_case_insensitive() {
        let state = state(Arc::new(ManualClock::starting_now()));
        let pair = state.issuer.issue(&Subject::from("alice")).unwrap();

        let auth = format!("bearer {}", pair.access_token);
        let response = app(state)
            .oneshot(request(Method::GET, "/whoami", Some(&auth)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "alice");
    }

    #[tokio::test]
    async fn test_login_route_skips_authentication() {
        let state = state(Arc::new(ManualClock::starting_now()));

        let response = app(state)
            .oneshot(request(Method::POST, "/auth", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rejects_missing_or_malformed_header() {
        let state = state(Arc::new(ManualClock::starting_now()));

        for auth in [None, Some("Basic abc"), Some("Bearer "), Some("Bear"), Some("Bearer not-a-jwt")] {
            let response = app(state.clone())
                .oneshot(request(Method::GET, "/whoami", auth))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{auth:?}");
            assert_eq!(
                response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
                "Bearer"
            );
        }
    }

    #[tokio::test]
    async fn test_rejects_foreign_signature() {
        let state = state(Arc::new(ManualClock::starting_now()));
        let foreign = JwtService::new("another-secret", SigningAlgorithm::HS256)
            .mint(&Subject::Id(1), TokenKind::Access, Duration::from_secs(60))
            .unwrap();

        let auth = format!("Bearer {foreign}");
        let response = app(state)
            .oneshot(request(Method::GET, "/whoami", Some(&auth)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rejects_expired_token() {
        let clock = Arc::new(ManualClock::starting_now());
        let state = state(clock.clone());
        let pair = state.issuer.issue(&Subject::Id(1)).unwrap();
        clock.advance(state.issuer.access_token_lifetime());

        let auth = format!("Bearer {}", pair.access_token);
        let response = app(state)
            .oneshot(request(Method::GET, "/whoami", Some(&auth)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(response).await.contains("Token has expired"));
    }

    #[tokio::test]
    async fn test_rejects_refresh_token_as_bearer() {
        let state = state(Arc::new(ManualClock::starting_now()));
        let pair = state.issuer.issue(&Subject::Id(1)).unwrap();

        let auth = format!("Bearer {}", pair.refresh_token);
        let response = app(state)
            .oneshot(request(Method::GET, "/whoami", Some(&auth)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rejects_token_without_subject() {
        let clock = Arc::new(ManualClock::starting_now());
        let state = state(clock.clone());
        let mut claims = TokenClaims::new(
            Subject::Id(1),
            TokenKind::Access,
            clock.unix_timestamp(),
            Duration::from_secs(60),
        );
        claims.user_id = None;
        let token = state.jwt_service.encode(&claims).unwrap();

        let auth = format!("Bearer {token}");
        let response = app(state)
            .oneshot(request(Method::GET, "/whoami", Some(&auth)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_extractor_without_middleware_is_unauthorized() {
        let app = Router::new().route("/whoami", get(whoami));

        let response = app
            .oneshot(request(Method::GET, "/whoami", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_state_rejects_invalid_config() {
        let result = AuthState::new(
            &TokenConfig::default(),
            Arc::new(InMemoryUserStorage::default()),
            Arc::new(InMemoryRevokedTokenStorage::new()),
        );
        assert!(result.is_err());
    }
}
