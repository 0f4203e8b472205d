//! Authentication service module
//!
//! Password login for dashboard accounts, refresh and logout on top of the
//! refresh coordinator.

mod password;
mod service;


pub use password::PasswordHasher;
pub use service::AuthService;
