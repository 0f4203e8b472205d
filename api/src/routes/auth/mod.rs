//! Session endpoints under `/api/v1/auth`
//!
//! - `POST /login` - check credentials, open a refresh family, set cookies
//! - `POST /refresh` - rotate the refresh cookie
//! - `POST /refresh/logout` - revoke the family of the refresh cookie, clear cookies
//! - `POST /logout-all` - revoke every family of the caller (behind the auth gate)

pub mod login;
pub mod logout;
pub mod refresh;

use std::sync::Arc;

use rserve_core::{AccountRepository, AuthService, Role, SessionStore, TokenPair};
use serde::{Deserialize, Serialize};

use crate::cookies::CookieManager;

pub use login::login;
pub use logout::{logout, logout_all};
pub use refresh::refresh;

/// Shared state handed to the auth handlers
pub struct AppState<A, S>
where
    A: AccountRepository,
    S: SessionStore,
{
    pub auth_service: Arc<AuthService<A, S>>,
    pub cookies: CookieManager,
}

impl<A, S> AppState<A, S>
where
    A: AccountRepository,
    S: SessionStore,
{
    pub fn new(auth_service: Arc<AuthService<A, S>>, cookies: CookieManager) -> Self {
        Self {
            auth_service,
            cookies,
        }
    }
}

/// Body of a successful login or refresh. The tokens travel in cookies only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub subject: String,
    pub role: Role,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

impl From<&TokenPair> for SessionResponse {
    fn from(pair: &TokenPair) -> Self {
        Self {
            subject: pair.subject.clone(),
            role: pair.role,
            expires_in: pair.access_expires_in,
        }
    }
}
