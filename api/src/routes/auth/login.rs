use actix_web::{web, HttpResponse};
use rserve_core::{AccountRepository, SessionStore};
use serde::Deserialize;

use crate::error::ApiResult;

use super::{AppState, SessionResponse};

/// Login credentials. No `Debug` so the password never reaches a log line.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub account_id: String,
    pub password: String,
}

/// Handler for POST /api/v1/auth/login
///
/// # Request Body
///
/// ```json
/// { "account_id": "string", "password": "string" }
/// ```
///
/// # Response
///
/// 200 with `{subject, role, expires_in}` and both auth cookies set.
/// 401 with the generic body for any credential failure.
pub async fn login<A, S>(
    state: web::Data<AppState<A, S>>,
    request: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse>
where
    A: AccountRepository + 'static,
    S: SessionStore + 'static,
{
    let pair = state
        .auth_service
        .login(&request.account_id, &request.password)
        .await?;

    let mut response = HttpResponse::Ok();
    state.cookies.set_auth_cookies(&mut response, &pair);
    Ok(response.json(SessionResponse::from(&pair)))
}
