//! Token entities for JWT-based authentication.

use chrono::{DateTime, Duration, Utc};
use rserve_shared::config::RefreshExpiryMode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::Role;
use crate::errors::TokenError;

/// `typ` claim of access tokens
pub const ACCESS_TOKEN_TYPE: &str = "access";

/// `typ` claim of refresh tokens
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Common view over the claim sets the codec handles
pub trait TokenClaims: Serialize + DeserializeOwned {
    /// Expected value of the `typ` claim
    const TOKEN_TYPE: &'static str;

    fn token_type(&self) -> &str;

    /// `iat` as a unix timestamp
    fn issued_at(&self) -> i64;

    /// `exp` as a unix timestamp
    fn expires_at(&self) -> i64;
}

/// Claims carried by an access token. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (restaurant account id)
    pub sub: String,

    pub role: Role,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Unique token id, fresh per issuance
    pub jti: String,

    pub iss: String,

    pub aud: String,

    pub typ: String,
}

impl AccessClaims {
    pub fn new(
        subject: impl Into<String>,
        role: Role,
        issued_at: DateTime<Utc>,
        ttl: Duration,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            sub: subject.into(),
            role,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
            iss: issuer.into(),
            aud: audience.into(),
            typ: ACCESS_TOKEN_TYPE.to_string(),
        }
    }
}

impl TokenClaims for AccessClaims {
    const TOKEN_TYPE: &'static str = ACCESS_TOKEN_TYPE;

    fn token_type(&self) -> &str {
        &self.typ
    }

    fn issued_at(&self) -> i64 {
        self.iat
    }

    fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// Claims carried by a refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,

    /// Refresh family id
    pub fid: String,

    /// Id of the [`RefreshRecord`] this token was minted for
    pub jti: String,

    pub iat: i64,

    /// Mirrors the record's `expires_at`
    pub exp: i64,

    pub iss: String,

    pub aud: String,

    pub typ: String,
}

impl RefreshClaims {
    /// Claims for the token that represents `record`
    pub fn for_record(
        record: &RefreshRecord,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            sub: record.subject.clone(),
            fid: record.family_id.to_string(),
            jti: record.token_id.to_string(),
            iat: record.issued_at.timestamp(),
            exp: record.expires_at.timestamp(),
            iss: issuer.into(),
            aud: audience.into(),
            typ: REFRESH_TOKEN_TYPE.to_string(),
        }
    }

    pub fn family_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.fid).map_err(|_| TokenError::Malformed)
    }

    pub fn token_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.jti).map_err(|_| TokenError::Malformed)
    }
}

impl TokenClaims for RefreshClaims {
    const TOKEN_TYPE: &'static str = REFRESH_TOKEN_TYPE;

    fn token_type(&self) -> &str {
        &self.typ
    }

    fn issued_at(&self) -> i64 {
        self.iat
    }

    fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// One link of a refresh family.
///
/// A family is an arena of records keyed by `family_id`; each record names its
/// predecessor through `parent_token_id`. The newest record is the family head
/// and its `token_id` is the only refresh token the family accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRecord {
    pub family_id: Uuid,

    /// Token id of this link; the family's current token id while it is the head
    pub token_id: Uuid,

    pub subject: String,

    pub role: Role,

    /// When the login that opened the family happened
    pub family_created_at: DateTime<Utc>,

    /// When this link was minted
    pub issued_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,

    /// Family-wide flag. Once set, no token of the family is accepted.
    pub revoked: bool,

    pub parent_token_id: Option<Uuid>,
}

impl RefreshRecord {
    /// First link of a new family (login)
    pub fn open(subject: impl Into<String>, role: Role, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            family_id: Uuid::new_v4(),
            token_id: Uuid::new_v4(),
            subject: subject.into(),
            role,
            family_created_at: now,
            issued_at: now,
            expires_at: now + ttl,
            revoked: false,
            parent_token_id: None,
        }
    }

    /// Next link after a rotation of `self`
    pub fn successor(&self, now: DateTime<Utc>, ttl: Duration, mode: RefreshExpiryMode) -> Self {
        let expires_at = match mode {
            RefreshExpiryMode::Absolute => self.family_created_at + ttl,
            RefreshExpiryMode::Sliding => now + ttl,
        };
        Self {
            family_id: self.family_id,
            token_id: Uuid::new_v4(),
            subject: self.subject.clone(),
            role: self.role,
            family_created_at: self.family_created_at,
            issued_at: now,
            expires_at,
            revoked: false,
            parent_token_id: Some(self.token_id),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Seconds until expiry, or zero if already expired
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

/// An encoded token together with the claims it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken<C> {
    pub token: String,
    pub claims: C,
}

/// Credentials handed to the transport layer after login or refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,

    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub access_expires_in: i64,

    /// Remaining refresh family lifetime in seconds
    pub refresh_expires_in: i64,

    pub subject: String,

    pub role: Role,

    pub family_id: Uuid,
}
