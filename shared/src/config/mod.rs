//! Configuration module with business-specific sub-modules
//!
//! - `auth` - token lifetimes, signing and cookie attributes
//! - `cache` - Redis connection for the Redis session backend
//! - `database` - MySQL pool for the MySQL session backend
//! - `environment` - environment detection and logging configuration
//! - `server` - HTTP server binding
//! - `session` - session store backend, timeouts and cleanup
//!
//! [`AppConfig::load`] layers, in increasing priority: built-in defaults for the
//! detected environment, an optional `config/<environment>.toml` file, and
//! `RSERVE__SECTION__KEY` environment variables. `SESSION_SECRET` overrides the
//! JWT secret last.

pub mod auth;
pub mod cache;
pub mod database;
pub mod environment;
pub mod server;
pub mod session;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{
    AuthConfig, CookieConfig, JwtConfig, RefreshExpiryMode, SameSitePolicy, DEFAULT_JWT_SECRET,
    MAX_CLOCK_SKEW_SECONDS,
};
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::ServerConfig;
pub use session::{SessionBackend, SessionConfig};

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl AppConfig {
    /// Built-in defaults for an environment
    pub fn for_environment(environment: Environment) -> Self {
        let server = match environment {
            Environment::Development => ServerConfig::default(),
            _ => ServerConfig::new("0.0.0.0", 8080),
        };
        Self {
            environment,
            server,
            auth: AuthConfig::default(),
            session: SessionConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Load configuration from defaults, optional file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = Environment::from_env();
        let defaults = Self::for_environment(environment);

        let layered = config::Config::builder()
            .add_source(config::Config::try_from(&defaults)?)
            .add_source(config::File::with_name(environment.config_file()).required(false))
            .add_source(
                config::Environment::with_prefix("RSERVE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut loaded: AppConfig = layered.try_deserialize()?;
        if let Ok(secret) = std::env::var("SESSION_SECRET") {
            if !secret.is_empty() {
                loaded.auth.jwt.secret = secret;
            }
        }

        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings that would weaken token handling
    pub fn validate(&self) -> Result<(), ConfigError> {
        let jwt = &self.auth.jwt;
        if jwt.secret.is_empty() {
            return Err(ConfigError::Invalid("auth.jwt.secret must not be empty".into()));
        }
        if self.environment.is_production() && jwt.is_using_default_secret() {
            return Err(ConfigError::Invalid(
                "auth.jwt.secret must be set in production (SESSION_SECRET)".into(),
            ));
        }
        if self.environment.is_production() && !self.auth.cookies.secure {
            return Err(ConfigError::Invalid(
                "auth.cookies.secure must be true in production".into(),
            ));
        }
        if !(0..=MAX_CLOCK_SKEW_SECONDS).contains(&jwt.clock_skew_seconds) {
            return Err(ConfigError::Invalid(format!(
                "auth.jwt.clock_skew_seconds must be between 0 and {}",
                MAX_CLOCK_SKEW_SECONDS
            )));
        }
        if jwt.access_token_expiry <= 0 || jwt.refresh_token_expiry <= 0 {
            return Err(ConfigError::Invalid("token lifetimes must be positive".into()));
        }
        if self.session.store_timeout_ms == 0 {
            return Err(ConfigError::Invalid("session.store_timeout_ms must be positive".into()));
        }
        Ok(())
    }
}
