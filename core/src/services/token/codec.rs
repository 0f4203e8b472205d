//! Signed token encoding and decoding

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{crypto, decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sha2::{Digest, Sha256};

use crate::clock::Clock;
use crate::domain::entities::token::TokenClaims;
use crate::errors::{DomainError, TokenError};

use super::config::TokenServiceConfig;

/// Encodes claims into signed JWTs and decodes them back.
///
/// Signature, issuer and audience are checked by `jsonwebtoken`. Time checks
/// are done here against the injected [`Clock`] so tests can pin the instant.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
    clock: Arc<dyn Clock>,
    clock_skew_seconds: i64,
}

impl TokenCodec {
    /// Creates a codec for HMAC-signed tokens
    ///
    /// # Returns
    ///
    /// * `Err(DomainError::Validation)` - empty secret or a non-HMAC algorithm
    pub fn new(config: &TokenServiceConfig, clock: Arc<dyn Clock>) -> Result<Self, DomainError> {
        if config.jwt_secret.is_empty() {
            return Err(DomainError::Validation {
                message: "JWT secret must not be empty".to_string(),
            });
        }
        if !matches!(
            config.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(DomainError::Validation {
                message: format!("Unsupported signing algorithm: {:?}", config.algorithm),
            });
        }

        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        // exp and iat are checked against the injected clock in `decode`
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            header: Header::new(config.algorithm),
            validation,
            clock,
            clock_skew_seconds: config.clock_skew_seconds,
        })
    }

    /// Current instant according to the injected clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn encode<C: TokenClaims>(&self, claims: &C) -> Result<String, TokenError> {
        encode(&self.header, claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Failed to encode token");
            TokenError::GenerationFailed
        })
    }

    /// Decodes and checks a token of claim type `C`
    ///
    /// # Returns
    ///
    /// * `Err(TokenError::InvalidSignature)` - signature, issuer or audience mismatch
    /// * `Err(TokenError::Expired)` - `now > exp + skew`
    /// * `Err(TokenError::Malformed)` - anything else, including a token of another type
    pub fn decode<C: TokenClaims>(&self, token: &str) -> Result<C, TokenError> {
        self.verify_signature(token)?;

        let claims = decode::<C>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidIssuer
                | ErrorKind::InvalidAudience => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })?;

        if claims.token_type() != C::TOKEN_TYPE {
            return Err(TokenError::Malformed);
        }

        let now = self.clock.now().timestamp();
        if claims.issued_at() > now + self.clock_skew_seconds {
            return Err(TokenError::Malformed);
        }
        if now > claims.expires_at() + self.clock_skew_seconds {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// HMAC check over `header.payload` before anything is parsed, so a
    /// change to any byte of the token reads as a bad signature
    fn verify_signature(&self, token: &str) -> Result<(), TokenError> {
        let (message, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
        if message.matches('.').count() != 1 || signature.is_empty() {
            return Err(TokenError::Malformed);
        }

        match crypto::verify(
            signature,
            message.as_bytes(),
            &self.decoding_key,
            self.header.alg,
        ) {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(TokenError::InvalidSignature),
        }
    }
}

/// Short, non-reversible token identifier for logs
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(12);
    hex
}
