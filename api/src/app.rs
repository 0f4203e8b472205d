//! Application factory
//!
//! Builds the actix-web [`App`] from already-constructed services so the
//! binary and the integration tests wire routes the same way.

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error, HttpResponse,
};
use rserve_core::{AccountRepository, SessionStore};
use rserve_shared::{error_codes, ErrorResponse};
use tracing_actix_web::TracingLogger;

use crate::middleware::AuthGate;
use crate::routes::auth::{login, logout, logout_all, refresh, AppState};
use crate::routes::me::me;

/// Create and configure the application with all dependencies
pub fn create_app<A, S>(
    app_state: web::Data<AppState<A, S>>,
    gate: AuthGate,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
>
where
    A: AccountRepository + 'static,
    S: SessionStore + 'static,
{
    App::new()
        .app_data(app_state)
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/auth")
                        .route("/login", web::post().to(login::<A, S>))
                        .route("/refresh", web::post().to(refresh::<A, S>))
                        .route("/refresh/logout", web::post().to(logout::<A, S>))
                        .service(
                            web::resource("/logout-all")
                                .route(web::post().to(logout_all::<A, S>))
                                .wrap(gate.clone()),
                        ),
                )
                .service(web::resource("/me").route(web::get().to(me)).wrap(gate)),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "rserve-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
