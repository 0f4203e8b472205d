//! Unit tests for the token issuer

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use rserve_shared::config::RefreshExpiryMode;

use crate::clock::ManualClock;
use crate::domain::entities::account::Role;
use crate::domain::entities::token::{AccessClaims, RefreshClaims};
use crate::errors::TokenError;
use crate::services::token::{TokenCodec, TokenIssuer, TokenServiceConfig};

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 8, 30, 0).unwrap()
}

fn setup(mode: RefreshExpiryMode) -> (Arc<ManualClock>, Arc<TokenCodec>, TokenIssuer) {
    let config = TokenServiceConfig {
        jwt_secret: "issuer-test-secret".to_string(),
        refresh_expiry_mode: mode,
        ..Default::default()
    };
    let clock = Arc::new(ManualClock::new(t0()));
    let codec = Arc::new(TokenCodec::new(&config, clock.clone()).unwrap());
    let issuer = TokenIssuer::new(codec.clone(), config);
    (clock, codec, issuer)
}

#[test]
fn test_issue_access() {
    let (_clock, codec, issuer) = setup(RefreshExpiryMode::Absolute);

    let issued = issuer.issue_access("r-7", Role::Employee).unwrap();
    assert_eq!(issued.claims.sub, "r-7");
    assert_eq!(issued.claims.role, Role::Employee);
    assert_eq!(issued.claims.iat, t0().timestamp());
    assert_eq!(issued.claims.exp, (t0() + Duration::minutes(15)).timestamp());

    let decoded: AccessClaims = codec.decode(&issued.token).unwrap();
    assert_eq!(decoded, issued.claims);
}

#[test]
fn test_access_tokens_are_unique() {
    let (_clock, _codec, issuer) = setup(RefreshExpiryMode::Absolute);

    let a = issuer.issue_access("r-7", Role::Owner).unwrap();
    let b = issuer.issue_access("r-7", Role::Owner).unwrap();
    assert_ne!(a.claims.jti, b.claims.jti);
    assert_ne!(a.token, b.token);
}

#[test]
fn test_issue_refresh_opens_family() {
    let (_clock, codec, issuer) = setup(RefreshExpiryMode::Absolute);

    let (record, issued) = issuer.issue_refresh("r-7", Role::Owner, None).unwrap();
    assert_eq!(record.expires_at, t0() + Duration::days(30));
    assert!(record.parent_token_id.is_none());

    let decoded: RefreshClaims = codec.decode(&issued.token).unwrap();
    assert_eq!(decoded.family_id().unwrap(), record.family_id);
    assert_eq!(decoded.token_id().unwrap(), record.token_id);
    assert_eq!(decoded.exp, record.expires_at.timestamp());
}

#[test]
fn test_refresh_lifetime_boundaries() {
    let (clock, codec, issuer) = setup(RefreshExpiryMode::Absolute);
    let (_record, issued) = issuer.issue_refresh("r-7", Role::Owner, None).unwrap();

    clock.set(t0() + Duration::days(29) + Duration::hours(23) + Duration::minutes(59));
    assert!(codec.decode::<RefreshClaims>(&issued.token).is_ok());

    clock.set(t0() + Duration::days(30) + Duration::minutes(1));
    assert_eq!(
        codec.decode::<RefreshClaims>(&issued.token),
        Err(TokenError::Expired)
    );
}

#[test]
fn test_rotation_keeps_absolute_ceiling() {
    let (clock, _codec, issuer) = setup(RefreshExpiryMode::Absolute);
    let (first, _) = issuer.issue_refresh("r-7", Role::Owner, None).unwrap();

    clock.advance(Duration::days(10));
    let (second, _) = issuer.issue_refresh("r-7", Role::Owner, Some(&first)).unwrap();

    assert_eq!(second.family_id, first.family_id);
    assert_ne!(second.token_id, first.token_id);
    assert_eq!(second.parent_token_id, Some(first.token_id));
    assert_eq!(second.expires_at, first.expires_at);
    assert_eq!(second.issued_at, t0() + Duration::days(10));
}

#[test]
fn test_rotation_slides_in_sliding_mode() {
    let (clock, _codec, issuer) = setup(RefreshExpiryMode::Sliding);
    let (first, _) = issuer.issue_refresh("r-7", Role::Owner, None).unwrap();

    clock.advance(Duration::days(10));
    let (second, _) = issuer.issue_refresh("r-7", Role::Owner, Some(&first)).unwrap();

    assert_eq!(second.expires_at, t0() + Duration::days(40));
}

#[test]
fn test_rotation_for_other_subject_rejected() {
    let (_clock, _codec, issuer) = setup(RefreshExpiryMode::Absolute);
    let (first, _) = issuer.issue_refresh("r-7", Role::Owner, None).unwrap();

    let result = issuer.issue_refresh("r-8", Role::Owner, Some(&first));
    assert!(matches!(result, Err(TokenError::Invalid)));
}

#[test]
fn test_issue_pair_for_rotation() {
    let (clock, codec, issuer) = setup(RefreshExpiryMode::Absolute);
    let (first, _) = issuer.issue_refresh("r-7", Role::Admin, None).unwrap();

    clock.advance(Duration::days(1));
    let (next, pair) = issuer.issue_pair("r-7", Role::Admin, Some(&first)).unwrap();

    assert_eq!(pair.subject, "r-7");
    assert_eq!(pair.role, Role::Admin);
    assert_eq!(pair.family_id, first.family_id);
    assert_eq!(pair.access_expires_in, 900);
    assert_eq!(pair.refresh_expires_in, Duration::days(29).num_seconds());

    let refresh: RefreshClaims = codec.decode(&pair.refresh_token).unwrap();
    assert_eq!(refresh.token_id().unwrap(), next.token_id);
    let access: AccessClaims = codec.decode(&pair.access_token).unwrap();
    assert_eq!(access.sub, "r-7");
}
