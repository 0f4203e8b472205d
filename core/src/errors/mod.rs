//! Domain-specific error types and error handling.

mod types;

// Re-export all error types
pub use types::{AuthError, StoreError, TokenError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DomainError {
    /// True for every failure a client should see as "not authenticated"
    pub fn is_authentication_failure(&self) -> bool {
        match self {
            DomainError::Auth(e) => !matches!(e, AuthError::Hashing { .. }),
            DomainError::Token(e) => !matches!(e, TokenError::GenerationFailed),
            _ => false,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests;
