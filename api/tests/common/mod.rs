//! Shared wiring for the HTTP integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration as StdDuration;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::web;
use chrono::{DateTime, TimeZone, Utc};
use rserve_api::{AppState, AuthGate, CookieManager};
use rserve_core::{
    Account, AuthService, InMemoryAccountRepository, InMemorySessionStore, ManualClock,
    PasswordHasher, RefreshCoordinator, Role, TokenCodec, TokenIssuer, TokenServiceConfig,
    TokenVerifier,
};
use rserve_shared::config::CookieConfig;

pub const ACCOUNT_ID: &str = "resto-42";
pub const PASSWORD: &str = "correct horse battery";
pub const OTHER_ACCOUNT_ID: &str = "resto-43";

pub type TestState = AppState<InMemoryAccountRepository, InMemorySessionStore>;

pub struct TestContext {
    pub clock: Arc<ManualClock>,
    pub codec: Arc<TokenCodec>,
    pub state: web::Data<TestState>,
    pub gate: AuthGate,
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

pub async fn context() -> TestContext {
    let config = TokenServiceConfig {
        jwt_secret: "api-test-secret".to_string(),
        ..Default::default()
    };
    let clock = Arc::new(ManualClock::new(t0()));
    let codec = Arc::new(TokenCodec::new(&config, clock.clone()).unwrap());
    let issuer = Arc::new(TokenIssuer::new(codec.clone(), config));
    let coordinator = Arc::new(RefreshCoordinator::new(
        Arc::new(InMemorySessionStore::new()),
        codec.clone(),
        issuer,
        StdDuration::from_secs(1),
    ));

    let hasher = PasswordHasher::new(4).unwrap();
    let accounts = Arc::new(InMemoryAccountRepository::new());
    for id in [ACCOUNT_ID, OTHER_ACCOUNT_ID] {
        accounts
            .insert(Account::new(id, hasher.hash(PASSWORD).await.unwrap(), Role::Owner))
            .await;
    }

    let auth_service = Arc::new(AuthService::new(accounts, coordinator, hasher));
    let cookies = CookieManager::new(CookieConfig::default());
    let gate = AuthGate::new(TokenVerifier::new(codec.clone()), cookies.clone());

    TestContext {
        clock,
        codec,
        state: web::Data::new(AppState::new(auth_service, cookies)),
        gate,
    }
}

/// Cookie of the given name set by a response
pub fn response_cookie<B>(resp: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.into_owned())
}

pub fn login_body(account_id: &str, password: &str) -> serde_json::Value {
    serde_json::json!({ "account_id": account_id, "password": password })
}
