//! HTTP middleware for bearer authentication.
//!
//! [`authentication_middleware`] gates every route except login and stores an
//! [`AuthContext`] in the request extensions. Handlers read it back through the
//! [`Authenticated`] extractor.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware::from_fn_with_state, routing::get};
//! use tokengate_auth::middleware::{Authenticated, authentication_middleware};
//!
//! async fn whoami(Authenticated(auth): Authenticated) -> String {
//!     auth.subject.to_string()
//! }
//!
//! let app = Router::new()
//!     .route("/whoami", get(whoami))
//!     .layer(from_fn_with_state(auth_state.clone(), authentication_middleware))
//!     .with_state(auth_state);
//! ```

pub mod auth;
pub mod error;
pub mod types;

pub use auth::{AuthState, Authenticated, authentication_middleware};
pub use error::detail_json;
pub use types::AuthContext;
