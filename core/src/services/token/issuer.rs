//! Minting of access and refresh tokens

use std::sync::Arc;

use crate::domain::entities::account::Role;
use crate::domain::entities::token::{
    AccessClaims, IssuedToken, RefreshClaims, RefreshRecord, TokenPair,
};
use crate::errors::TokenError;

use super::codec::TokenCodec;
use super::config::TokenServiceConfig;

/// Mints signed tokens. Holds no session state; persisting refresh records is
/// the caller's job.
pub struct TokenIssuer {
    codec: Arc<TokenCodec>,
    config: TokenServiceConfig,
}

impl TokenIssuer {
    pub fn new(codec: Arc<TokenCodec>, config: TokenServiceConfig) -> Self {
        Self { codec, config }
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Access token with a fresh `jti`
    pub fn issue_access(
        &self,
        subject: &str,
        role: Role,
    ) -> Result<IssuedToken<AccessClaims>, TokenError> {
        let claims = AccessClaims::new(
            subject,
            role,
            self.codec.now(),
            self.config.access_token_ttl,
            self.config.issuer.as_str(),
            self.config.audience.as_str(),
        );
        let token = self.codec.encode(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    /// Refresh token for a new family, or for the next link after `parent`.
    ///
    /// The returned record is not stored yet. For a rotation the caller must
    /// swap it in with `SessionStore::rotate`.
    pub fn issue_refresh(
        &self,
        subject: &str,
        role: Role,
        parent: Option<&RefreshRecord>,
    ) -> Result<(RefreshRecord, IssuedToken<RefreshClaims>), TokenError> {
        let now = self.codec.now();
        let record = match parent {
            Some(parent) if parent.subject != subject => return Err(TokenError::Invalid),
            Some(parent) => parent.successor(
                now,
                self.config.refresh_token_ttl,
                self.config.refresh_expiry_mode,
            ),
            None => RefreshRecord::open(subject, role, now, self.config.refresh_token_ttl),
        };

        let issued = self.encode_refresh(&record)?;
        Ok((record, issued))
    }

    /// Encodes the token that represents `record`
    pub fn encode_refresh(
        &self,
        record: &RefreshRecord,
    ) -> Result<IssuedToken<RefreshClaims>, TokenError> {
        let claims = RefreshClaims::for_record(
            record,
            self.config.issuer.as_str(),
            self.config.audience.as_str(),
        );
        let token = self.codec.encode(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    /// New access token plus the next refresh token of a family.
    ///
    /// With `parent` set this is a rotation; otherwise a new family is opened.
    pub fn issue_pair(
        &self,
        subject: &str,
        role: Role,
        parent: Option<&RefreshRecord>,
    ) -> Result<(RefreshRecord, TokenPair), TokenError> {
        let (record, refresh) = self.issue_refresh(subject, role, parent)?;
        let access = self.issue_access(&record.subject, record.role)?;

        let pair = TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_in: self.config.access_token_ttl.num_seconds(),
            refresh_expires_in: record.seconds_until_expiry(self.codec.now()),
            subject: record.subject.clone(),
            role: record.role,
            family_id: record.family_id,
        };
        Ok((record, pair))
    }
}
