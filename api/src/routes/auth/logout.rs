use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use rserve_core::{AccountRepository, SessionStore};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthContext;

use super::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// Number of refresh families revoked by this call
    pub revoked: usize,
}

/// Handler for POST /api/v1/auth/refresh/logout
///
/// Revokes the family of the refresh cookie when it verifies. The cookies are
/// cleared on every outcome, including a store failure.
pub async fn logout<A, S>(state: web::Data<AppState<A, S>>, req: HttpRequest) -> HttpResponse
where
    A: AccountRepository + 'static,
    S: SessionStore + 'static,
{
    let token = state.cookies.refresh_token(&req);

    match state.auth_service.logout(token.as_deref()).await {
        Ok(revoked) => {
            let mut response = HttpResponse::Ok();
            state.cookies.clear_auth_cookies(&mut response);
            response.json(LogoutResponse {
                revoked: usize::from(revoked),
            })
        }
        Err(e) => {
            let error = ApiError::from(e);
            let mut response = HttpResponse::build(error.status_code());
            state.cookies.clear_auth_cookies(&mut response);
            error.render(response)
        }
    }
}

/// Handler for POST /api/v1/auth/logout-all
///
/// Revokes every session of the authenticated account and clears the caller's
/// cookies. Access tokens already handed out stay valid until they expire.
pub async fn logout_all<A, S>(
    state: web::Data<AppState<A, S>>,
    auth: AuthContext,
) -> ApiResult<HttpResponse>
where
    A: AccountRepository + 'static,
    S: SessionStore + 'static,
{
    let revoked = state.auth_service.logout_everywhere(&auth.subject).await?;
    info!(subject = %auth.subject, revoked, "Signed out of every session");

    let mut response = HttpResponse::Ok();
    state.cookies.clear_auth_cookies(&mut response);
    Ok(response.json(LogoutResponse { revoked }))
}
