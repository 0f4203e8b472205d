//! Account repository trait defining lookup of dashboard accounts.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::entities::account::Account;
use crate::errors::DomainError;

/// Read access to the accounts that may sign in.
///
/// Account provisioning happens elsewhere; login only ever needs a lookup.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account by its restaurant id
    ///
    /// # Returns
    /// * `Ok(Some(Account))` - Account exists
    /// * `Ok(None)` - No such account
    /// * `Err(DomainError)` - Backend failure
    async fn find_by_id(&self, id: &str) -> Result<Option<Account>, DomainError>;
}

#[async_trait]
impl<A: AccountRepository + ?Sized> AccountRepository for Arc<A> {
    async fn find_by_id(&self, id: &str) -> Result<Option<Account>, DomainError> {
        (**self).find_by_id(id).await
    }
}
