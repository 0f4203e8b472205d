//! Session store trait defining persistence of refresh families.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::token::RefreshRecord;
use crate::errors::StoreError;

/// Durable record of refresh families and their revocation state.
///
/// Implementations must make [`SessionStore::rotate`] an atomic
/// compare-and-swap on the family head: of two concurrent rotations presenting
/// the same `old_token_id`, exactly one may succeed.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist the first record of a new family
    ///
    /// # Returns
    /// * `Ok(RefreshRecord)` - The stored record
    /// * `Err(StoreError::DuplicateTokenId)` - The token id was used before
    async fn create(&self, record: RefreshRecord) -> Result<RefreshRecord, StoreError>;

    /// Current head of a family. `revoked` reflects the family flag.
    async fn lookup(&self, family_id: Uuid) -> Result<RefreshRecord, StoreError>;

    /// Every record of a family, oldest first
    async fn history(&self, family_id: Uuid) -> Result<Vec<RefreshRecord>, StoreError>;

    /// Append `next` as the new head if the head is still `old_token_id`
    ///
    /// # Returns
    /// * `Ok(RefreshRecord)` - `next`, now the family head
    /// * `Err(StoreError::Conflict)` - The head moved on or the family is revoked
    /// * `Err(StoreError::NotFound)` - No such family
    async fn rotate(
        &self,
        family_id: Uuid,
        old_token_id: Uuid,
        next: RefreshRecord,
    ) -> Result<RefreshRecord, StoreError>;

    /// Revoke a family. Returns `false` if it was already revoked.
    async fn revoke(&self, family_id: Uuid) -> Result<bool, StoreError>;

    async fn is_revoked(&self, family_id: Uuid) -> Result<bool, StoreError>;

    /// Revoke every live family of a subject, returning how many were revoked
    async fn revoke_subject(&self, subject: &str) -> Result<usize, StoreError>;

    /// Drop families whose head expired before `now`, returning how many
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError>;
}

#[async_trait]
impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    async fn create(&self, record: RefreshRecord) -> Result<RefreshRecord, StoreError> {
        (**self).create(record).await
    }

    async fn lookup(&self, family_id: Uuid) -> Result<RefreshRecord, StoreError> {
        (**self).lookup(family_id).await
    }

    async fn history(&self, family_id: Uuid) -> Result<Vec<RefreshRecord>, StoreError> {
        (**self).history(family_id).await
    }

    async fn rotate(
        &self,
        family_id: Uuid,
        old_token_id: Uuid,
        next: RefreshRecord,
    ) -> Result<RefreshRecord, StoreError> {
        (**self).rotate(family_id, old_token_id, next).await
    }

    async fn revoke(&self, family_id: Uuid) -> Result<bool, StoreError> {
        (**self).revoke(family_id).await
    }

    async fn is_revoked(&self, family_id: Uuid) -> Result<bool, StoreError> {
        (**self).is_revoked(family_id).await
    }

    async fn revoke_subject(&self, subject: &str) -> Result<usize, StoreError> {
        (**self).revoke_subject(subject).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        (**self).delete_expired(now).await
    }
}
