//! # RServe Core
//!
//! Domain layer for the RServe dashboard back end: signed access and refresh
//! tokens, refresh-token families with rotation and replay detection, account
//! login, and the storage interfaces the infrastructure layer implements.

pub mod clock;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::entities::{
    AccessClaims, Account, IssuedToken, RefreshClaims, RefreshRecord, Role, TokenClaims,
    TokenPair,
};
pub use errors::{AuthError, DomainError, DomainResult, StoreError, TokenError};
pub use repositories::{
    AccountRepository, InMemoryAccountRepository, InMemorySessionStore, SessionStore,
};
pub use services::{
    AuthService, CleanupResult, PasswordHasher, RefreshCoordinator, SessionCleanupConfig,
    SessionCleanupService, TokenCodec, TokenIssuer, TokenServiceConfig, TokenVerifier,
};
