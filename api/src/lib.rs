//! HTTP surface of the RServe session service: cookie transport, the access
//! gate and the login, refresh and logout endpoints.

pub mod app;
pub mod cookies;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::create_app;
pub use cookies::CookieManager;
pub use error::{ApiError, ApiResult};
pub use middleware::{AuthContext, AuthGate};
pub use routes::auth::AppState;
