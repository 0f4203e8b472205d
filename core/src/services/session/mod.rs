//! Refresh family lifecycle
//!
//! - `RefreshCoordinator`: opens families, redeems and rotates refresh
//!   tokens, detects replay, revokes on logout
//! - `SessionCleanupService`: periodic purge of expired families

mod cleanup;
mod coordinator;


pub use cleanup::{CleanupResult, SessionCleanupConfig, SessionCleanupService};
pub use coordinator::RefreshCoordinator;

use std::future::Future;
use std::time::Duration;

use crate::errors::StoreError;

/// Runs a store call with an upper time bound
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout {
            timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}
