//! Cookie transport for the token pair.
//!
//! Tokens never appear in response bodies. Both cookies are `HttpOnly`, carry
//! the configured `Secure` and `SameSite` attributes, and are cleared with the
//! same attributes they were set with so the browser matches them.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::dev::ServiceRequest;
use actix_web::{HttpRequest, HttpResponseBuilder};
use rserve_core::TokenPair;
use rserve_shared::config::{CookieConfig, SameSitePolicy};

/// Sets, clears and reads the auth cookies
#[derive(Debug, Clone, Default)]
pub struct CookieManager {
    config: CookieConfig,
}

impl CookieManager {
    pub fn new(config: CookieConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CookieConfig {
        &self.config
    }

    /// Attach both tokens of `pair`
    pub fn set_auth_cookies(&self, response: &mut HttpResponseBuilder, pair: &TokenPair) {
        response.cookie(self.access_cookie(&pair.access_token, pair.access_expires_in));
        response.cookie(self.refresh_cookie(&pair.refresh_token, pair.refresh_expires_in));
    }

    /// Expire both cookies on the client
    pub fn clear_auth_cookies(&self, response: &mut HttpResponseBuilder) {
        response.cookie(self.access_cookie("", 0));
        response.cookie(self.refresh_cookie("", 0));
    }

    pub fn access_cookie(&self, value: &str, max_age_secs: i64) -> Cookie<'static> {
        self.build(
            &self.config.access_cookie_name,
            value,
            &self.config.access_path,
            max_age_secs,
        )
    }

    pub fn refresh_cookie(&self, value: &str, max_age_secs: i64) -> Cookie<'static> {
        self.build(
            &self.config.refresh_cookie_name,
            value,
            &self.config.refresh_path,
            max_age_secs,
        )
    }

    /// Access token sent with the request, if any
    pub fn access_token<M: CookieSource>(&self, req: &M) -> Option<String> {
        read(req, &self.config.access_cookie_name)
    }

    /// Refresh token sent with the request, if any
    pub fn refresh_token<M: CookieSource>(&self, req: &M) -> Option<String> {
        read(req, &self.config.refresh_cookie_name)
    }

    fn build(&self, name: &str, value: &str, path: &str, max_age_secs: i64) -> Cookie<'static> {
        let mut builder = Cookie::build(name.to_owned(), value.to_owned())
            .http_only(true)
            .secure(self.config.secure)
            .same_site(same_site(self.config.same_site))
            .path(path.to_owned())
            .max_age(Duration::seconds(max_age_secs.max(0)));

        if let Some(domain) = &self.config.domain {
            builder = builder.domain(domain.clone());
        }
        builder.finish()
    }
}

fn same_site(policy: SameSitePolicy) -> SameSite {
    match policy {
        SameSitePolicy::Strict => SameSite::Strict,
        SameSitePolicy::Lax => SameSite::Lax,
    }
}

/// Request types that expose their cookies
pub trait CookieSource {
    fn cookie(&self, name: &str) -> Option<Cookie<'static>>;
}

impl CookieSource for HttpRequest {
    fn cookie(&self, name: &str) -> Option<Cookie<'static>> {
        HttpRequest::cookie(self, name)
    }
}

impl CookieSource for ServiceRequest {
    fn cookie(&self, name: &str) -> Option<Cookie<'static>> {
        ServiceRequest::cookie(self, name)
    }
}

fn read<M: CookieSource>(req: &M, name: &str) -> Option<String> {
    req.cookie(name)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test::TestRequest, HttpResponse};
    use rserve_core::Role;
    use uuid::Uuid;

    fn pair() -> TokenPair {
        TokenPair {
            access_token: "access.jwt".into(),
            refresh_token: "refresh.jwt".into(),
            access_expires_in: 900,
            refresh_expires_in: 2_592_000,
            subject: "resto-1".into(),
            role: Role::Owner,
            family_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_set_auth_cookies_attributes() {
        let manager = CookieManager::default();
        let mut builder = HttpResponse::Ok();
        manager.set_auth_cookies(&mut builder, &pair());
        let response = builder.finish();

        let cookies: Vec<_> = response.cookies().collect();
        assert_eq!(cookies.len(), 2);

        let access = cookies.iter().find(|c| c.name() == "access_token").unwrap();
        assert_eq!(access.value(), "access.jwt");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Strict));
        assert_eq!(access.path(), Some("/"));
        assert_eq!(access.max_age(), Some(Duration::seconds(900)));

        let refresh = cookies.iter().find(|c| c.name() == "refresh_token").unwrap();
        assert_eq!(refresh.value(), "refresh.jwt");
        assert_eq!(refresh.http_only(), Some(true));
        assert_eq!(refresh.secure(), Some(true));
        assert_eq!(refresh.path(), Some("/api/v1/auth/refresh"));
        assert_eq!(refresh.max_age(), Some(Duration::seconds(2_592_000)));
    }

    #[test]
    fn test_clear_keeps_attributes() {
        let manager = CookieManager::new(CookieConfig {
            same_site: SameSitePolicy::Lax,
            ..CookieConfig::default()
        });
        let mut builder = HttpResponse::Ok();
        manager.clear_auth_cookies(&mut builder);
        let response = builder.finish();

        for cookie in response.cookies() {
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
            assert_eq!(cookie.http_only(), Some(true));
            assert_eq!(cookie.secure(), Some(true));
            assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        }
        assert_eq!(response.cookies().count(), 2);
    }

    #[test]
    fn test_reads_cookies_from_request() {
        let manager = CookieManager::default();
        let req = TestRequest::default()
            .cookie(Cookie::new("access_token", "a"))
            .cookie(Cookie::new("refresh_token", ""))
            .to_http_request();

        assert_eq!(manager.access_token(&req), Some("a".to_string()));
        assert_eq!(manager.refresh_token(&req), None);
    }
}
