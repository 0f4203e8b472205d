//! Main authentication service implementation

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::entities::token::TokenPair;
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::{AccountRepository, SessionStore};
use crate::services::session::RefreshCoordinator;

use super::password::PasswordHasher;

/// Authentication service for dashboard accounts
pub struct AuthService<A, S>
where
    A: AccountRepository,
    S: SessionStore,
{
    /// Account lookup
    accounts: Arc<A>,
    /// Refresh family lifecycle
    coordinator: Arc<RefreshCoordinator<S>>,
    hasher: PasswordHasher,
}

impl<A, S> AuthService<A, S>
where
    A: AccountRepository,
    S: SessionStore,
{
    pub fn new(
        accounts: Arc<A>,
        coordinator: Arc<RefreshCoordinator<S>>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            accounts,
            coordinator,
            hasher,
        }
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator<S>> {
        &self.coordinator
    }

    /// Check a password and open a new refresh family
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Credentials for the new session
    /// * `Err(AuthError::MissingCredentials)` - Empty id or password
    /// * `Err(AuthError::InvalidCredentials)` - Unknown account or wrong password
    pub async fn login(&self, account_id: &str, password: &str) -> DomainResult<TokenPair> {
        let account_id = account_id.trim();
        if account_id.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials.into());
        }

        let account = match self.accounts.find_by_id(account_id).await? {
            Some(account) => account,
            None => {
                self.hasher.verify_dummy(password).await;
                warn!(account_id, "Login for unknown account");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self.hasher.verify(password, &account.password_hash).await? {
            warn!(account_id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let pair = self.coordinator.open_family(&account.id, account.role).await?;
        info!(account_id, role = %account.role, "Login succeeded");
        Ok(pair)
    }

    /// Rotate a refresh token
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        self.coordinator.redeem(refresh_token).await
    }

    /// End the session the refresh token belongs to
    ///
    /// A missing or unusable token is not an error: there is nothing to revoke.
    /// Returns whether a family was revoked.
    pub async fn logout(&self, refresh_token: Option<&str>) -> DomainResult<bool> {
        let Some(token) = refresh_token else {
            return Ok(false);
        };

        match self.coordinator.revoke_token(token).await {
            Ok(revoked) => Ok(revoked),
            Err(DomainError::Token(e)) => {
                debug!(kind = e.kind(), "Logout with unusable refresh token");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Revoke every session of an account
    pub async fn logout_everywhere(&self, account_id: &str) -> DomainResult<usize> {
        self.coordinator.revoke_subject(account_id).await
    }
}
