use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokengate_auth::{
    AuthState, InMemoryRevokedTokenStorage, InMemoryUserStorage, authentication_middleware, healthcheck_handler, login_handler, logout_handler,
    refresh_handler,
};
use tower_http::trace::TraceLayer;

use crate::{config::AppConfig, middleware as app_middleware};

pub struct TokengateServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(cfg: &AppConfig, auth_state: AuthState) -> Router {
    let body_limit = cfg.server.body_limit_bytes;
    Router::new()
        .route("/", get(healthcheck_handler))
        .route("/auth", post(login_handler).delete(logout_handler))
        .route("/auth/refresh", post(refresh_handler))
        // Unmatched paths fall through to 404 without authentication.
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            authentication_middleware,
        ))
        .with_state(auth_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        // Outside TraceLayer so the span sees the id.
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn build(self) -> anyhow::Result<TokengateServer> {
        let user_storage = Arc::new(InMemoryUserStorage::new(self.config.users.clone()));
        let revoked_token_storage = Arc::new(InMemoryRevokedTokenStorage::new());

        let auth_state = AuthState::new(&self.config.auth, user_storage, revoked_token_storage)?;

        tracing::info!(
            algorithm = %auth_state.jwt_service.algorithm(),
            access_ttl_secs = auth_state.issuer.access_token_lifetime().as_secs(),
            refresh_ttl_secs = auth_state.issuer.refresh_token_lifetime().as_secs(),
            rotate_refresh_tokens = self.config.auth.rotate_refresh_tokens,
            users = self.config.users.len(),
            "Auth state initialized"
        );

        Ok(TokengateServer {
            addr: self.addr,
            app: build_app(&self.config, auth_state),
        })
    }
}

impl TokengateServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
