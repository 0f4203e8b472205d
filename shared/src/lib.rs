//! Shared utilities and common types for the RServe server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types and the layered loader
//! - Error response envelope and error codes

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, ConfigError, CookieConfig, DatabaseConfig, Environment,
    JwtConfig, LoggingConfig, RefreshExpiryMode, ServerConfig, SessionBackend, SessionConfig,
};
pub use errors::{error_codes, ErrorResponse};
