//! Error response rendering.
//!
//! Every error leaves the service as `{"detail": "..."}`. 401 responses also
//! carry `WWW-Authenticate: Bearer`.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AuthError;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.is_server_error() {
            tracing::error!(error = %self, category = %self.category(), "Request failed");
        }

        let mut response = (status, Json(detail_json(&self.detail()))).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

/// Creates the JSON error body for `detail`.
#[must_use]
pub fn detail_json(detail: &str) -> serde_json::Value {
    json!({ "detail": detail })
}
