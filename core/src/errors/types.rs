//! Error type definitions for token handling, session storage and login.
//!
//! The variants keep the precise failure for logging. The presentation layer
//! collapses them into one undifferentiated response.

use thiserror::Error;
use uuid::Uuid;

/// Authentication-related errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password hashing failed: {message}")]
    Hashing { message: String },
}

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not a parseable token of the expected kind
    #[error("Malformed token")]
    Malformed,

    /// Signature, issuer or audience did not verify
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    /// The refresh family was revoked
    #[error("Token revoked")]
    Revoked,

    /// A superseded refresh token was presented again
    #[error("Refresh token replay detected")]
    ReplayDetected,

    /// Verified token that does not match any live session
    #[error("Invalid token")]
    Invalid,

    #[error("Token generation failed")]
    GenerationFailed,
}

impl TokenError {
    /// Short stable name for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::Expired => "expired",
            TokenError::Revoked => "revoked",
            TokenError::ReplayDetected => "replay_detected",
            TokenError::Invalid => "invalid",
            TokenError::GenerationFailed => "generation_failed",
        }
    }
}

/// Session store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Refresh family not found: {family_id}")]
    NotFound { family_id: Uuid },

    /// Compare-and-swap lost: the presented token is no longer the family head
    #[error("Rotation conflict in family {family_id}")]
    Conflict { family_id: Uuid },

    #[error("Token id already used: {token_id}")]
    DuplicateTokenId { token_id: Uuid },

    #[error("Session store timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("Session store failure: {message}")]
    Backend { message: String },
}
