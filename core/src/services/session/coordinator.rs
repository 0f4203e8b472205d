//! Refresh token redemption with rotation and replay detection

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::entities::account::Role;
use crate::domain::entities::token::{RefreshClaims, TokenPair};
use crate::errors::{DomainError, StoreError, TokenError};
use crate::repositories::SessionStore;
use crate::services::token::{fingerprint, TokenCodec, TokenIssuer};

use super::bounded;

/// Owns every state transition of a refresh family.
///
/// Each presented refresh token is redeemed at most once. Presenting a token
/// that is no longer the family head revokes the whole family.
pub struct RefreshCoordinator<S: SessionStore> {
    store: Arc<S>,
    codec: Arc<TokenCodec>,
    issuer: Arc<TokenIssuer>,
    store_timeout: Duration,
}

impl<S: SessionStore> RefreshCoordinator<S> {
    pub fn new(
        store: Arc<S>,
        codec: Arc<TokenCodec>,
        issuer: Arc<TokenIssuer>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            codec,
            issuer,
            store_timeout,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Starts a new family for a freshly authenticated subject
    pub async fn open_family(&self, subject: &str, role: Role) -> Result<TokenPair, DomainError> {
        let (record, pair) = self.issuer.issue_pair(subject, role, None)?;
        bounded(self.store_timeout, self.store.create(record)).await?;

        info!(family_id = %pair.family_id, subject, "Refresh family opened");
        Ok(pair)
    }

    /// Exchanges a refresh token for a new access token and the next refresh
    /// token of the same family.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - the presented token was the family head and has been rotated
    /// * `Err(TokenError::Expired | Malformed)` - the token itself is unusable
    /// * `Err(TokenError::Invalid)` - bad signature or unknown family
    /// * `Err(TokenError::Revoked)` - the family was revoked earlier
    /// * `Err(TokenError::ReplayDetected)` - the token was already redeemed; the family is now revoked
    /// * `Err(StoreError::Timeout)` - the store did not answer in time
    pub async fn redeem(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        let presented = fingerprint(refresh_token);

        let claims = match self.codec.decode::<RefreshClaims>(refresh_token) {
            Ok(claims) => claims,
            Err(e @ (TokenError::Expired | TokenError::Malformed)) => {
                warn!(kind = e.kind(), token = %presented, "Refresh token rejected");
                return Err(e.into());
            }
            Err(e) => {
                warn!(kind = e.kind(), token = %presented, "Refresh token rejected");
                return Err(TokenError::Invalid.into());
            }
        };
        let family_id = claims.family_id()?;
        let token_id = claims.token_id()?;

        let head = match bounded(self.store_timeout, self.store.lookup(family_id)).await {
            Ok(head) => head,
            Err(StoreError::NotFound { .. }) => {
                warn!(%family_id, token = %presented, "Refresh token for unknown family");
                return Err(TokenError::Invalid.into());
            }
            Err(e) => return Err(e.into()),
        };

        if head.revoked {
            warn!(%family_id, subject = %head.subject, "Refresh token of revoked family");
            return Err(TokenError::Revoked.into());
        }
        if head.subject != claims.sub {
            warn!(%family_id, "Refresh token subject does not match family");
            return Err(TokenError::Invalid.into());
        }
        if head.token_id != token_id {
            return Err(self.replay_detected(family_id, &head.subject).await);
        }
        if head.is_expired_at(self.codec.now()) {
            warn!(%family_id, subject = %head.subject, "Refresh family expired");
            return Err(TokenError::Expired.into());
        }

        // Tokens are minted before the swap so a successful rotation always
        // has credentials to hand back.
        let (next, pair) = self.issuer.issue_pair(&head.subject, head.role, Some(&head))?;

        match bounded(self.store_timeout, self.store.rotate(family_id, token_id, next)).await {
            Ok(_) => {
                info!(%family_id, subject = %head.subject, "Refresh token rotated");
                Ok(pair)
            }
            Err(StoreError::Conflict { .. }) => Err(self.replay_detected(family_id, &head.subject).await),
            Err(e) => Err(e.into()),
        }
    }

    /// Revokes the family a refresh token belongs to (logout).
    ///
    /// The token must verify but need not be the family head. Returns `false`
    /// when the family was unknown or already revoked.
    pub async fn revoke_token(&self, refresh_token: &str) -> Result<bool, DomainError> {
        let claims = self.codec.decode::<RefreshClaims>(refresh_token)?;
        self.revoke_family(claims.family_id()?).await
    }

    pub async fn revoke_family(&self, family_id: Uuid) -> Result<bool, DomainError> {
        match bounded(self.store_timeout, self.store.revoke(family_id)).await {
            Ok(revoked) => {
                if revoked {
                    info!(%family_id, "Refresh family revoked");
                }
                Ok(revoked)
            }
            Err(StoreError::NotFound { .. }) => {
                debug!(%family_id, "Revocation of unknown family ignored");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Revokes every live family of a subject
    pub async fn revoke_subject(&self, subject: &str) -> Result<usize, DomainError> {
        let count = bounded(self.store_timeout, self.store.revoke_subject(subject)).await?;
        info!(subject, count, "Revoked all refresh families of subject");
        Ok(count)
    }

    async fn replay_detected(&self, family_id: Uuid, subject: &str) -> DomainError {
        warn!(%family_id, subject, "Refresh token replay detected, revoking family");
        match self.revoke_family(family_id).await {
            Ok(_) => TokenError::ReplayDetected.into(),
            Err(e) => e,
        }
    }
}
