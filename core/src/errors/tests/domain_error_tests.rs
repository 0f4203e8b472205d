//! Unit tests for domain error classification

use uuid::Uuid;

use crate::errors::{AuthError, DomainError, StoreError, TokenError};

#[test]
fn test_token_failures_are_authentication_failures() {
    for err in [
        TokenError::Malformed,
        TokenError::InvalidSignature,
        TokenError::Expired,
        TokenError::Revoked,
        TokenError::ReplayDetected,
        TokenError::Invalid,
    ] {
        assert!(DomainError::from(err).is_authentication_failure());
    }
}

#[test]
fn test_generation_failure_is_not_an_authentication_failure() {
    assert!(!DomainError::from(TokenError::GenerationFailed).is_authentication_failure());
}

#[test]
fn test_store_failures_are_not_authentication_failures() {
    let err = DomainError::from(StoreError::Timeout { timeout_ms: 10 });
    assert!(!err.is_authentication_failure());

    let err = DomainError::from(StoreError::NotFound { family_id: Uuid::new_v4() });
    assert!(!err.is_authentication_failure());
}

#[test]
fn test_bad_credentials_are_authentication_failures() {
    assert!(DomainError::from(AuthError::InvalidCredentials).is_authentication_failure());
}

#[test]
fn test_kind_names_are_stable() {
    assert_eq!(TokenError::ReplayDetected.kind(), "replay_detected");
    assert_eq!(TokenError::InvalidSignature.kind(), "invalid_signature");
}
