//! Mapping of domain failures to HTTP responses.
//!
//! Every authentication failure renders the same 401 body so a client cannot
//! tell which check failed. The precise kind only reaches the logs.

use actix_web::{http::StatusCode, HttpResponse, HttpResponseBuilder, ResponseError};
use rserve_core::{DomainError, StoreError, TokenError};
use rserve_shared::{error_codes, ErrorResponse};
use thiserror::Error;
use tracing::{error, warn};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// No usable credential cookie on the request
    #[error("Not authenticated")]
    Unauthenticated,
}

impl ApiError {
    /// Response body for this error
    pub fn body(&self) -> ErrorResponse {
        match self.status_code() {
            StatusCode::BAD_REQUEST => {
                ErrorResponse::new(error_codes::BAD_REQUEST, "Malformed request")
            }
            StatusCode::UNAUTHORIZED => ErrorResponse::unauthorized(),
            StatusCode::SERVICE_UNAVAILABLE => ErrorResponse::new(
                error_codes::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable",
            ),
            _ => ErrorResponse::new(error_codes::INTERNAL_ERROR, "Internal server error"),
        }
    }

    /// Render onto a builder that may already carry headers or cookies
    pub fn render(&self, mut builder: HttpResponseBuilder) -> HttpResponse {
        self.log();
        builder.json(self.body())
    }

    fn log(&self) {
        match self {
            ApiError::Domain(DomainError::Token(e)) => {
                warn!(kind = e.kind(), "Token rejected")
            }
            ApiError::Domain(DomainError::Auth(e)) if self.status_code().is_client_error() => {
                warn!(error = %e, "Authentication failed")
            }
            ApiError::Domain(DomainError::Store(StoreError::Timeout { timeout_ms })) => {
                warn!(timeout_ms, "Session store timed out")
            }
            ApiError::Domain(e) => error!(error = %e, "Request failed"),
            ApiError::Unauthenticated => {}
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Domain(DomainError::Token(TokenError::Malformed)) => StatusCode::BAD_REQUEST,
            ApiError::Domain(DomainError::Validation { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Domain(e) if e.is_authentication_failure() => StatusCode::UNAUTHORIZED,
            ApiError::Domain(DomainError::Store(StoreError::Timeout { .. })) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Domain(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.render(HttpResponse::build(self.status_code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rserve_core::AuthError;

    fn status_of(error: impl Into<DomainError>) -> StatusCode {
        ApiError::from(error.into()).status_code()
    }

    #[test]
    fn test_malformed_token_is_bad_request() {
        assert_eq!(status_of(TokenError::Malformed), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_token_failures_are_unauthorized() {
        for e in [
            TokenError::InvalidSignature,
            TokenError::Expired,
            TokenError::Revoked,
            TokenError::ReplayDetected,
            TokenError::Invalid,
        ] {
            assert_eq!(status_of(e), StatusCode::UNAUTHORIZED);
        }
        assert_eq!(status_of(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::MissingCredentials), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_store_failures() {
        assert_eq!(
            status_of(StoreError::Timeout { timeout_ms: 10 }),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(StoreError::Backend { message: "down".into() }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_of(TokenError::GenerationFailed), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unauthorized_body_does_not_name_the_check() {
        let expired = ApiError::from(DomainError::from(TokenError::Expired)).body();
        let replay = ApiError::from(DomainError::from(TokenError::ReplayDetected)).body();
        assert_eq!(expired.error, replay.error);
        assert_eq!(expired.message, replay.message);
        assert_eq!(ApiError::Unauthenticated.body().message, expired.message);
    }
}
