//! Unit tests for the token codec and verifier

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use crate::clock::ManualClock;
use crate::domain::entities::account::Role;
use crate::domain::entities::token::{AccessClaims, RefreshClaims, RefreshRecord};
use crate::errors::TokenError;
use crate::services::token::{fingerprint, TokenCodec, TokenServiceConfig, TokenVerifier};

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 8, 30, 0).unwrap()
}

fn config() -> TokenServiceConfig {
    TokenServiceConfig {
        jwt_secret: "codec-test-secret".to_string(),
        ..Default::default()
    }
}

fn setup(config: &TokenServiceConfig) -> (Arc<ManualClock>, Arc<TokenCodec>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let codec = Arc::new(TokenCodec::new(config, clock.clone()).unwrap());
    (clock, codec)
}

fn access_claims(config: &TokenServiceConfig) -> AccessClaims {
    AccessClaims::new(
        "r-42",
        Role::Owner,
        t0(),
        config.access_token_ttl,
        config.issuer.as_str(),
        config.audience.as_str(),
    )
}

/// Replaces one character in the middle of the payload segment
fn tamper_payload(token: &str) -> String {
    let parts: Vec<&str> = token.split('.').collect();
    let mut payload: Vec<char> = parts[1].chars().collect();
    let i = payload.len() / 2;
    payload[i] = if payload[i] == 'A' { 'B' } else { 'A' };
    let payload: String = payload.into_iter().collect();
    format!("{}.{}.{}", parts[0], payload, parts[2])
}

#[test]
fn test_round_trip() {
    let config = config();
    let (_clock, codec) = setup(&config);
    let claims = access_claims(&config);

    let token = codec.encode(&claims).unwrap();
    let decoded: AccessClaims = codec.decode(&token).unwrap();

    assert_eq!(decoded, claims);
}

#[test]
fn test_access_token_lifetime_boundaries() {
    let config = config();
    let (clock, codec) = setup(&config);
    let verifier = TokenVerifier::new(codec.clone());
    let token = codec.encode(&access_claims(&config)).unwrap();

    clock.set(t0() + Duration::minutes(14) + Duration::seconds(59));
    assert!(verifier.verify_access(&token).is_ok());

    clock.set(t0() + Duration::minutes(15));
    assert!(verifier.verify_access(&token).is_ok());

    clock.set(t0() + Duration::minutes(15) + Duration::seconds(1));
    assert_eq!(verifier.verify_access(&token), Err(TokenError::Expired));
}

#[test]
fn test_clock_skew_extends_acceptance() {
    let config = TokenServiceConfig {
        clock_skew_seconds: 30,
        ..config()
    };
    let (clock, codec) = setup(&config);
    let token = codec.encode(&access_claims(&config)).unwrap();

    clock.set(t0() + Duration::minutes(15) + Duration::seconds(30));
    assert!(codec.decode::<AccessClaims>(&token).is_ok());

    clock.set(t0() + Duration::minutes(15) + Duration::seconds(31));
    assert_eq!(codec.decode::<AccessClaims>(&token), Err(TokenError::Expired));
}

#[test]
fn test_tampered_payload_fails_signature() {
    let config = config();
    let (_clock, codec) = setup(&config);
    let token = codec.encode(&access_claims(&config)).unwrap();

    let tampered = tamper_payload(&token);
    assert_ne!(tampered, token);
    assert_eq!(
        codec.decode::<AccessClaims>(&tampered),
        Err(TokenError::InvalidSignature)
    );
}

#[test]
fn test_any_tampered_byte_fails_signature() {
    let config = config();
    let (_clock, codec) = setup(&config);
    let token = codec.encode(&access_claims(&config)).unwrap();

    for (i, c) in token.char_indices().filter(|(_, c)| *c != '.') {
        let replacement = if c == 'A' { 'B' } else { 'A' };
        let mut tampered = token.clone();
        tampered.replace_range(i..i + 1, &replacement.to_string());

        assert_eq!(
            codec.decode::<AccessClaims>(&tampered),
            Err(TokenError::InvalidSignature),
            "byte {} of {}",
            i,
            token.len()
        );
    }
}

#[test]
fn test_foreign_secret_fails_signature() {
    let config = config();
    let (_clock, codec) = setup(&config);
    let other_config = TokenServiceConfig {
        jwt_secret: "someone-else".to_string(),
        ..config.clone()
    };
    let (_other_clock, other) = setup(&other_config);

    let token = other.encode(&access_claims(&config)).unwrap();
    assert_eq!(
        codec.decode::<AccessClaims>(&token),
        Err(TokenError::InvalidSignature)
    );
}

#[test]
fn test_wrong_audience_rejected() {
    let config = config();
    let (_clock, codec) = setup(&config);
    let mut claims = access_claims(&config);
    claims.aud = "another-app".to_string();

    let token = codec.encode(&claims).unwrap();
    assert_eq!(
        codec.decode::<AccessClaims>(&token),
        Err(TokenError::InvalidSignature)
    );
}

#[test]
fn test_garbage_is_malformed() {
    let config = config();
    let (_clock, codec) = setup(&config);

    assert_eq!(codec.decode::<AccessClaims>(""), Err(TokenError::Malformed));
    assert_eq!(
        codec.decode::<AccessClaims>("not-a-token"),
        Err(TokenError::Malformed)
    );
    assert_eq!(
        codec.decode::<AccessClaims>("a.b"),
        Err(TokenError::Malformed)
    );
    assert_eq!(
        codec.decode::<AccessClaims>("a.b.c.d"),
        Err(TokenError::Malformed)
    );
    // Three segments that do not verify are treated as a forged token
    assert_eq!(
        codec.decode::<AccessClaims>("a.b.c"),
        Err(TokenError::InvalidSignature)
    );
}

#[test]
fn test_refresh_token_is_not_an_access_token() {
    let config = config();
    let (_clock, codec) = setup(&config);
    let record = RefreshRecord::open("r-42", Role::Owner, t0(), config.refresh_token_ttl);
    let claims = RefreshClaims::for_record(&record, config.issuer.as_str(), config.audience.as_str());
    let token = codec.encode(&claims).unwrap();

    let verifier = TokenVerifier::new(codec.clone());
    assert_eq!(verifier.verify_access(&token), Err(TokenError::Malformed));
    assert!(codec.decode::<RefreshClaims>(&token).is_ok());
}

#[test]
fn test_wrong_type_claim_is_malformed() {
    let config = config();
    let (_clock, codec) = setup(&config);
    let mut claims = access_claims(&config);
    claims.typ = "refresh".to_string();

    let token = codec.encode(&claims).unwrap();
    assert_eq!(codec.decode::<AccessClaims>(&token), Err(TokenError::Malformed));
}

#[test]
fn test_issued_in_future_is_malformed() {
    let config = config();
    let (_clock, codec) = setup(&config);
    let claims = AccessClaims::new(
        "r-42",
        Role::Owner,
        t0() + Duration::minutes(5),
        config.access_token_ttl,
        config.issuer.as_str(),
        config.audience.as_str(),
    );

    let token = codec.encode(&claims).unwrap();
    assert_eq!(codec.decode::<AccessClaims>(&token), Err(TokenError::Malformed));
}

#[test]
fn test_empty_secret_rejected() {
    let config = TokenServiceConfig {
        jwt_secret: String::new(),
        ..Default::default()
    };
    let clock = Arc::new(ManualClock::new(t0()));
    assert!(TokenCodec::new(&config, clock).is_err());
}

#[test]
fn test_fingerprint() {
    let a = fingerprint("token-a");
    assert_eq!(a.len(), 12);
    assert_eq!(a, fingerprint("token-a"));
    assert_ne!(a, fingerprint("token-b"));
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
}
