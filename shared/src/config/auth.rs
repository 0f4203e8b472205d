//! Token and cookie configuration

use serde::{Deserialize, Serialize};

/// Placeholder secret used only when nothing else is configured
pub const DEFAULT_JWT_SECRET: &str = "rserve-development-secret-change-me";

/// Upper bound for the clock-skew allowance, in seconds
pub const MAX_CLOCK_SKEW_SECONDS: i64 = 60;

/// How a refresh family's expiry reacts to rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshExpiryMode {
    /// Fixed ceiling measured from the login that opened the family
    #[default]
    Absolute,
    /// Ceiling pushed forward on every rotation
    Sliding,
}

/// JWT signing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// HS256 signing secret
    pub secret: String,

    /// Access token lifetime in seconds
    #[serde(default = "default_access_expiry")]
    pub access_token_expiry: i64,

    /// Refresh family lifetime in seconds
    #[serde(default = "default_refresh_expiry")]
    pub refresh_token_expiry: i64,

    /// `iss` claim
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// `aud` claim
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Tolerated clock drift when checking `exp` and `iat`, at most 60 seconds
    #[serde(default)]
    pub clock_skew_seconds: i64,

    #[serde(default)]
    pub refresh_expiry_mode: RefreshExpiryMode,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_JWT_SECRET),
            access_token_expiry: default_access_expiry(),
            refresh_token_expiry: default_refresh_expiry(),
            issuer: default_issuer(),
            audience: default_audience(),
            clock_skew_seconds: 0,
            refresh_expiry_mode: RefreshExpiryMode::Absolute,
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    pub fn with_refresh_expiry_mode(mut self, mode: RefreshExpiryMode) -> Self {
        self.refresh_expiry_mode = mode;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

/// `SameSite` policy for auth cookies. `None` is deliberately not offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    #[default]
    Strict,
    Lax,
}

/// Cookie transport configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CookieConfig {
    #[serde(default = "default_access_cookie")]
    pub access_cookie_name: String,

    #[serde(default = "default_refresh_cookie")]
    pub refresh_cookie_name: String,

    /// Path of the access cookie
    #[serde(default = "default_access_path")]
    pub access_path: String,

    /// Path the refresh cookie is restricted to
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,

    /// `Secure` attribute. Only disable behind a TLS-terminating proxy in local setups.
    #[serde(default = "default_secure")]
    pub secure: bool,

    #[serde(default)]
    pub same_site: SameSitePolicy,

    #[serde(default)]
    pub domain: Option<String>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_cookie_name: default_access_cookie(),
            refresh_cookie_name: default_refresh_cookie(),
            access_path: default_access_path(),
            refresh_path: default_refresh_path(),
            secure: default_secure(),
            same_site: SameSitePolicy::Strict,
            domain: None,
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Cookie configuration
    #[serde(default)]
    pub cookies: CookieConfig,
}

impl AuthConfig {
    pub fn jwt_secret(&self) -> &str {
        &self.jwt.secret
    }

    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.jwt.access_token_expiry
    }

    pub fn refresh_token_expiry_seconds(&self) -> i64 {
        self.jwt.refresh_token_expiry
    }
}

fn default_access_expiry() -> i64 {
    900 // 15 minutes
}

fn default_refresh_expiry() -> i64 {
    30 * 86400 // 30 days
}

fn default_issuer() -> String {
    String::from("rserve")
}

fn default_audience() -> String {
    String::from("rserve-dashboard")
}

fn default_access_cookie() -> String {
    String::from("access_token")
}

fn default_refresh_cookie() -> String {
    String::from("refresh_token")
}

fn default_access_path() -> String {
    String::from("/")
}

// Logout is served under this path so it still receives the refresh token.
fn default_refresh_path() -> String {
    String::from("/api/v1/auth/refresh")
}

fn default_secure() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_defaults() {
        let jwt = JwtConfig::default();
        assert_eq!(jwt.access_token_expiry, 15 * 60);
        assert_eq!(jwt.refresh_token_expiry, 30 * 24 * 60 * 60);
        assert_eq!(jwt.refresh_expiry_mode, RefreshExpiryMode::Absolute);
        assert_eq!(jwt.clock_skew_seconds, 0);
        assert!(jwt.is_using_default_secret());
    }

    #[test]
    fn test_jwt_builders() {
        let jwt = JwtConfig::new("s3cret")
            .with_access_expiry_minutes(5)
            .with_refresh_expiry_days(7)
            .with_refresh_expiry_mode(RefreshExpiryMode::Sliding);
        assert_eq!(jwt.access_token_expiry, 300);
        assert_eq!(jwt.refresh_token_expiry, 7 * 86400);
        assert_eq!(jwt.refresh_expiry_mode, RefreshExpiryMode::Sliding);
        assert!(!jwt.is_using_default_secret());
    }

    #[test]
    fn test_cookie_defaults_are_locked_down() {
        let cookies = CookieConfig::default();
        assert!(cookies.secure);
        assert_eq!(cookies.same_site, SameSitePolicy::Strict);
        assert_eq!(cookies.access_path, "/");
        assert_eq!(cookies.refresh_path, "/api/v1/auth/refresh");
    }

    #[test]
    fn test_expiry_mode_deserializes_lowercase() {
        let mode: RefreshExpiryMode = serde_json::from_str("\"sliding\"").unwrap();
        assert_eq!(mode, RefreshExpiryMode::Sliding);
    }
}
