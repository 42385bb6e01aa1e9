//! Login, refresh, logout, and healthcheck handlers.
//!
//! # Request Format
//!
//! ```text
//! POST /auth
//! Content-Type: application/json
//!
//! {"email": "james@james.james", "password": "1234567"}
//! ```
//!
//! ```text
//! POST /auth/refresh            DELETE /auth
//! Authorization: Bearer <access_token>
//! Content-Type: application/json
//!
//! {"access_token": "<refresh_token>", "token_type": "refresh"}
//! ```

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::{Value, json};

use crate::AuthResult;
use crate::error::AuthError;
use crate::middleware::{AuthState, Authenticated};

use super::types::{AuthResponse, LoginRequest, StatusResponse, Token};

/// `POST /auth`: exchanges credentials for a token pair.
///
/// # Errors
///
/// - `InvalidRequest` (422) if the body is not a valid login request
/// - `InvalidCredentials` (400) if no user matches
pub async fn login_handler(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AuthResult<Json<AuthResponse>> {
    let Json(request) = payload.map_err(rejection_to_error)?;

    if !is_valid_email(&request.email) {
        return Err(AuthError::invalid_request(
            "value is not a valid email address",
        ));
    }

    let user = state
        .user_storage
        .find_by_credentials(&request.email, &request.password)
        .await?
        .ok_or_else(|| {
            tracing::info!(email = %request.email, "Login failed");
            AuthError::InvalidCredentials
        })?;

    let pair = state.issuer.issue(&user.id)?;

    tracing::info!(subject = %user.id, "User logged in");
    Ok(Json(pair.into()))
}

/// `POST /auth/refresh`: exchanges a refresh token for new credentials.
///
/// # Errors
///
/// See [`RefreshProtocol::refresh`](crate::token::RefreshProtocol::refresh).
pub async fn refresh_handler(
    State(state): State<AuthState>,
    Authenticated(auth): Authenticated,
    payload: Result<Json<Token>, JsonRejection>,
) -> AuthResult<Json<AuthResponse>> {
    let Json(token) = payload.map_err(rejection_to_error)?;

    let pair = state
        .refresh_protocol
        .refresh(&auth.subject, &token.access_token)
        .await?;

    Ok(Json(pair.into()))
}

/// `DELETE /auth`: revokes a refresh token.
///
/// # Errors
///
/// See [`RefreshProtocol::revoke`](crate::token::RefreshProtocol::revoke).
pub async fn logout_handler(
    State(state): State<AuthState>,
    Authenticated(auth): Authenticated,
    payload: Result<Json<Token>, JsonRejection>,
) -> AuthResult<Json<StatusResponse>> {
    let Json(token) = payload.map_err(rejection_to_error)?;

    state
        .refresh_protocol
        .revoke(&auth.subject, &token.access_token)
        .await?;

    tracing::info!(subject = %auth.subject, "User logged out");
    Ok(Json(StatusResponse::ok()))
}

/// `GET /`: liveness probe.
pub async fn healthcheck_handler() -> Json<Value> {
    Json(json!({ "Healthcheck": "ok" }))
}

fn rejection_to_error(rejection: JsonRejection) -> AuthError {
    tracing::debug!(error = %rejection, "Rejected request body");
    AuthError::invalid_request(rejection.body_text())
}

/// Minimal structural address check: `local@domain.tld`, no whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}
