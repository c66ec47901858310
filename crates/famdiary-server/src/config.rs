//! Server configuration, read from the environment.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `JWT_SECRET` | HS256 signing secret | required in production |
//! | `FAMDIARY_ENV` | `production` or `development` | `development` |
//! | `FAMDIARY_BIND` | listen address | `127.0.0.1:3000` |
//! | `FAMDIARY_LOG_DIR` | directory for daily log files | unset (stderr only) |

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

const SECRET_ENV: &str = "JWT_SECRET";
const ENVIRONMENT_ENV: &str = "FAMDIARY_ENV";
const BIND_ENV: &str = "FAMDIARY_BIND";
const LOG_DIR_ENV: &str = "FAMDIARY_LOG_DIR";

const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Signing secret used only when running in development without one.
const DEVELOPMENT_SECRET: &str = "famdiary-development-secret";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set in production")]
    MissingSecret,

    #[error("Unknown environment {0:?}, expected \"production\" or \"development\"")]
    UnknownEnvironment(String),

    #[error("Invalid bind address {value:?}: {source}")]
    InvalidBind {
        value: String,
        source: std::net::AddrParseError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" | "" => Ok(Environment::Development),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Clone)]
pub struct ServerConfig {
    pub environment: Environment,
    pub bind: SocketAddr,
    pub jwt_secret: String,
    pub log_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    ///
    /// Refuses to produce a config for production without a signing secret.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = match lookup(ENVIRONMENT_ENV) {
            Some(value) => Environment::parse(&value)?,
            None => Environment::Development,
        };

        let jwt_secret = match lookup(SECRET_ENV).filter(|s| !s.trim().is_empty()) {
            Some(secret) => secret,
            None if environment.is_production() => return Err(ConfigError::MissingSecret),
            None => DEVELOPMENT_SECRET.to_string(),
        };

        let bind_value = lookup(BIND_ENV).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_value
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidBind {
                value: bind_value.clone(),
                source,
            })?;

        let log_dir = lookup(LOG_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            bind,
            jwt_secret,
            log_dir,
        })
    }

    /// True when no secret was configured and the development key is in use
    pub fn uses_development_secret(&self) -> bool {
        self.jwt_secret == DEVELOPMENT_SECRET
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("environment", &self.environment)
            .field("bind", &self.bind)
            .field("jwt_secret", &"<redacted>")
            .field("log_dir", &self.log_dir)
            .finish()
    }
}
