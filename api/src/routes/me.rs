use actix_web::HttpResponse;
use rserve_core::Role;
use serde::{Deserialize, Serialize};

use crate::middleware::AuthContext;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub subject: String,
    pub role: Role,
}

/// Handler for GET /api/v1/me
pub async fn me(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse {
        subject: auth.subject,
        role: auth.role,
    })
}
