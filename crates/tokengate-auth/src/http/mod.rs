//! Axum handlers for the token endpoints.
//!
//! | Method   | Path            | Handler                |
//! |----------|-----------------|------------------------|
//! | `POST`   | `/auth`         | [`login_handler`]      |
//! | `POST`   | `/auth/refresh` | [`refresh_handler`]    |
//! | `DELETE` | `/auth`         | [`logout_handler`]     |
//! | `GET`    | `/`             | [`healthcheck_handler`]|
//!
//! All handlers expect [`AuthState`](crate::middleware::AuthState) as router
//! state; all but login expect to run behind
//! [`authentication_middleware`](crate::middleware::authentication_middleware).

pub mod handlers;
pub mod types;

pub use handlers::{healthcheck_handler, login_handler, logout_handler, refresh_handler};
pub use types::{AuthResponse, LoginRequest, StatusResponse, Token};
