use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokengate_auth::{TokenConfig, User};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Token signing and lifetime settings
    #[serde(default)]
    pub auth: TokenConfig,
    /// Accounts seeded into the in-memory user store
    #[serde(default)]
    pub users: Vec<User>,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be > 0".into()));
        }
        if self.server.body_limit_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.body_limit_bytes must be > 0".into(),
            ));
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "logging.level must be one of {valid_levels:?}"
            )));
        }
        self.auth.validate()?;
        for (i, user) in self.users.iter().enumerate() {
            if user.email.is_empty() {
                return Err(ConfigError::Invalid(format!("users[{i}].email is empty")));
            }
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}
fn default_body_limit() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("invalid auth configuration: {0}")]
    Auth(#[from] tokengate_auth::ConfigError),
}

pub mod loader {
    use super::{AppConfig, ConfigError};
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub const DEFAULT_CONFIG_FILE: &str = "tokengate.toml";
    pub const ENV_PREFIX: &str = "TOKENGATE";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, ConfigError> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., TOKENGATE__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator("__"),
        );
        let merged: AppConfig = builder.build()?.try_deserialize()?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AppConfig {
        AppConfig {
            auth: TokenConfig::with_secret("secret"),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.users.is_empty());
        assert_eq!(cfg.addr().to_string(), "0.0.0.0:8000");
    }

    #[test]
    fn test_validate() {
        assert!(valid().validate().is_ok());

        // Empty secret
        assert!(matches!(
            AppConfig::default().validate(),
            Err(ConfigError::Auth(_))
        ));

        let mut cfg = valid();
        cfg.server.port = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let mut cfg = valid();
        cfg.logging.level = "loud".into();
        assert!(cfg.validate().is_err());

        let mut cfg = valid();
        cfg.users.push(User::new(1, "", "pw"));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_addr_falls_back_on_bad_host() {
        let mut cfg = valid();
        cfg.server.host = "not-an-ip".into();
        cfg.server.port = 9000;
        assert_eq!(cfg.addr().to_string(), "0.0.0.0:9000");
    }
}
