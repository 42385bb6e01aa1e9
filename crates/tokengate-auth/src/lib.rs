//! # tokengate-auth
//!
//! Access/refresh token service core for tokengate.
//!
//! This crate provides:
//! - Signed access and refresh tokens with injected-clock expiry
//! - Credential pair issuance
//! - A bearer authentication middleware for axum
//! - Refresh token rotation with reuse and theft detection
//! - A revocation cache behind a pluggable storage trait
//!
//! ## Modules
//!
//! - [`clock`] - Time source abstraction
//! - [`config`] - Token configuration
//! - [`token`] - Token codec, issuer, and refresh protocol
//! - [`storage`] - Storage traits for revoked tokens and users
//! - [`middleware`] - Bearer authentication middleware and extractor
//! - [`http`] - Axum handlers for the token endpoints

pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod storage;
pub mod token;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, TokenConfig};
pub use error::{AuthError, ErrorCategory};
pub use http::{
    AuthResponse, LoginRequest, StatusResponse, Token, healthcheck_handler, login_handler,
    logout_handler, refresh_handler,
};
pub use middleware::{AuthContext, AuthState, Authenticated, authentication_middleware};
pub use storage::{
    InMemoryRevokedTokenStorage, InMemoryUserStorage, RevokedTokenStorage, User, UserStorage,
};
pub use token::{
    JwtError, JwtService, RefreshProtocol, SigningAlgorithm, TokenClaims, TokenIssuer, TokenKind,
    TokenPair,
};
pub use types::Subject;

/// Type alias for authentication results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use tokengate_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{ConfigError, TokenConfig};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::middleware::{AuthContext, AuthState, Authenticated, authentication_middleware};
    pub use crate::storage::{RevokedTokenStorage, User, UserStorage};
    pub use crate::token::{JwtService, RefreshProtocol, TokenIssuer, TokenKind, TokenPair};
    pub use crate::types::Subject;
}
