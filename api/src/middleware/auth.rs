//! Access-token gate for protected routes.
//!
//! Reads the access cookie, verifies it statelessly and injects an
//! [`AuthContext`] into the request extensions. The session store is never
//! consulted, so an access token stays valid until it expires even after
//! logout.

use actix_web::{
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use rserve_core::{AccessClaims, Role, TokenVerifier};
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};
use tracing::{debug, warn};

use crate::cookies::CookieManager;
use crate::error::ApiError;

/// Identity of the caller on a request that passed [`AuthGate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub subject: String,
    pub role: Role,
    /// `jti` of the access token
    pub token_id: String,
}

impl From<AccessClaims> for AuthContext {
    fn from(claims: AccessClaims) -> Self {
        Self {
            subject: claims.sub,
            role: claims.role,
            token_id: claims.jti,
        }
    }
}

/// Middleware factory
#[derive(Clone)]
pub struct AuthGate {
    verifier: TokenVerifier,
    cookies: CookieManager,
}

impl AuthGate {
    pub fn new(verifier: TokenVerifier, cookies: CookieManager) -> Self {
        Self { verifier, cookies }
    }

    fn authenticate(&self, req: &ServiceRequest) -> Result<AuthContext, ApiError> {
        let Some(token) = self.cookies.access_token(req) else {
            debug!(path = %req.path(), "Request without access cookie");
            return Err(ApiError::Unauthenticated);
        };

        match self.verifier.verify_access(&token) {
            Ok(claims) => Ok(AuthContext::from(claims)),
            Err(e) => {
                warn!(kind = e.kind(), path = %req.path(), "Access token rejected");
                Err(ApiError::Unauthenticated)
            }
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateMiddleware {
            service: Rc::new(service),
            gate: self.clone(),
        }))
    }
}

pub struct AuthGateMiddleware<S> {
    service: Rc<S>,
    gate: AuthGate,
}

impl<S, B> Service<ServiceRequest> for AuthGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let context = match self.gate.authenticate(&req) {
            Ok(context) => context,
            Err(e) => {
                let response = req.error_response(e).map_into_right_body();
                return Box::pin(ready(Ok(response)));
            }
        };

        req.extensions_mut().insert(context);

        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let response = service.call(req).await?;
            Ok(response.map_into_left_body())
        })
    }
}

/// Extractor for handlers behind [`AuthGate`]
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthenticated.into());

        ready(result)
    }
}
