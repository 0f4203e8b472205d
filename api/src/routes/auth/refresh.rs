use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use rserve_core::{AccountRepository, DomainError, SessionStore, TokenError};

use crate::error::ApiError;

use super::{AppState, SessionResponse};

/// Handler for POST /api/v1/auth/refresh
///
/// Rotates the refresh cookie and issues a new access cookie for the same
/// family. When the family is dead (revoked or replayed) the stale cookies
/// are cleared along with the 401.
pub async fn refresh<A, S>(state: web::Data<AppState<A, S>>, req: HttpRequest) -> HttpResponse
where
    A: AccountRepository + 'static,
    S: SessionStore + 'static,
{
    let Some(token) = state.cookies.refresh_token(&req) else {
        return ApiError::Unauthenticated.error_response();
    };

    match state.auth_service.refresh(&token).await {
        Ok(pair) => {
            let mut response = HttpResponse::Ok();
            state.cookies.set_auth_cookies(&mut response, &pair);
            response.json(SessionResponse::from(&pair))
        }
        Err(e) => {
            let session_dead = matches!(
                e,
                DomainError::Token(TokenError::Revoked | TokenError::ReplayDetected)
            );
            let error = ApiError::from(e);
            let mut response = HttpResponse::build(error.status_code());
            if session_dead {
                state.cookies.clear_auth_cookies(&mut response);
            }
            error.render(response)
        }
    }
}
