//! Storage interfaces and the in-process implementations.
//!
//! Durable backends (MySQL, Redis) live in the infrastructure crate.

pub mod account;
pub mod session;

pub use account::{AccountRepository, InMemoryAccountRepository};
pub use session::{InMemorySessionStore, SessionStore};
