//! Business services containing domain logic and use cases.

pub mod auth;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use auth::{AuthService, PasswordHasher};
pub use session::{
    CleanupResult, RefreshCoordinator, SessionCleanupConfig, SessionCleanupService,
};
pub use token::{TokenCodec, TokenIssuer, TokenServiceConfig, TokenVerifier};
