//! Configuration for the token services

use chrono::Duration;
use jsonwebtoken::Algorithm;
use rserve_shared::config::{JwtConfig, RefreshExpiryMode, DEFAULT_JWT_SECRET};

/// Configuration for the token services
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// JWT signing algorithm
    pub algorithm: Algorithm,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh family lifetime
    pub refresh_token_ttl: Duration,
    pub issuer: String,
    pub audience: String,
    /// Tolerated clock drift in seconds
    pub clock_skew_seconds: i64,
    pub refresh_expiry_mode: RefreshExpiryMode,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            algorithm: Algorithm::HS256,
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(30),
            issuer: "rserve".to_string(),
            audience: "rserve-dashboard".to_string(),
            clock_skew_seconds: 0,
            refresh_expiry_mode: RefreshExpiryMode::Absolute,
        }
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(jwt: &JwtConfig) -> Self {
        Self {
            jwt_secret: jwt.secret.clone(),
            algorithm: Algorithm::HS256,
            access_token_ttl: Duration::seconds(jwt.access_token_expiry),
            refresh_token_ttl: Duration::seconds(jwt.refresh_token_expiry),
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
            clock_skew_seconds: jwt.clock_skew_seconds,
            refresh_expiry_mode: jwt.refresh_expiry_mode,
        }
    }
}
