// Tracing initialization with a configurable log level.
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global subscriber filtered at `level`.
///
/// `RUST_LOG` wins over the configured level.
pub fn init_tracing(level: &str) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}

pub fn shutdown_tracing() {
    tracing::info!("tracing shut down");
}
