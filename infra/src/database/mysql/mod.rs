//! MySQL implementations of the core storage traits

mod account_repository_impl;
mod session_store_impl;

pub use account_repository_impl::MySqlAccountRepository;
pub use session_store_impl::MySqlSessionStore;
