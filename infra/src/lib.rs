//! # Infrastructure Layer
//!
//! Durable backends for the RServe session subsystem.
//!
//! ## Architecture
//!
//! - **Database**: MySQL session store and account repository using SQLx
//! - **Cache**: Redis session store with Lua compare-and-swap rotation
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-cache`: Enable Redis session storage (default)

use rserve_core::errors::StoreError;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Cache module - Redis client and session store
#[cfg(feature = "redis-cache")]
pub mod cache;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[cfg(feature = "mysql")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database migration error
    #[cfg(feature = "mysql")]
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Redis error
    #[cfg(feature = "redis-cache")]
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Wraps a backend failure for the session store contract
#[cfg(any(feature = "mysql", feature = "redis-cache"))]
pub(crate) fn backend_error(context: &str, e: impl std::fmt::Display) -> StoreError {
    tracing::error!(error = %e, "{}", context);
    StoreError::Backend {
        message: format!("{}: {}", context, e),
    }
}
