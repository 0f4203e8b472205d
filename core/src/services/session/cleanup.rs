//! Session cleanup service for periodic removal of expired refresh families

use std::sync::Arc;
use std::time::Duration;

use rserve_shared::config::SessionConfig;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::errors::DomainError;
use crate::repositories::SessionStore;

use super::bounded;

/// Configuration for session cleanup
#[derive(Debug, Clone)]
pub struct SessionCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// Upper bound for the store call
    pub store_timeout: Duration,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for SessionCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            store_timeout: Duration::from_secs(2),
            enabled: true,
        }
    }
}

impl From<&SessionConfig> for SessionCleanupConfig {
    fn from(session: &SessionConfig) -> Self {
        Self {
            interval_seconds: session.cleanup_interval_seconds,
            store_timeout: Duration::from_millis(session.store_timeout_ms),
            enabled: session.cleanup_interval_seconds > 0,
        }
    }
}

/// Service for purging expired refresh families
pub struct SessionCleanupService<S: SessionStore + 'static> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: SessionCleanupConfig,
}

impl<S: SessionStore> SessionCleanupService<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: SessionCleanupConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Run a single cleanup cycle
    ///
    /// # Returns
    /// * `Ok(CleanupResult)` - Summary of the cycle; store failures are collected in `errors`
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        info!("Starting session cleanup cycle");

        let mut result = CleanupResult::default();
        let now = self.clock.now();

        match bounded(self.config.store_timeout, self.store.delete_expired(now)).await {
            Ok(count) => {
                result.expired_families_deleted = count;
                info!("Deleted {} expired refresh families", count);
            }
            Err(e) => {
                error!("Failed to delete expired refresh families: {}", e);
                result.errors.push(format!("Session cleanup error: {}", e));
            }
        }

        Ok(result)
    }

    /// Start the cleanup service as a background task
    ///
    /// This spawns a tokio task that runs cleanup at regular intervals
    pub fn start_background_task(self: Arc<Self>) {
        if !self.config.enabled {
            warn!("Session cleanup service is disabled");
            return;
        }

        let interval = Duration::from_secs(self.config.interval_seconds);

        tokio::spawn(async move {
            info!(
                "Session cleanup service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_cleanup().await {
                    Ok(result) => {
                        if !result.errors.is_empty() {
                            warn!("Cleanup completed with errors: {:?}", result.errors);
                        }
                    }
                    Err(e) => {
                        error!("Session cleanup cycle failed: {}", e);
                    }
                }
            }
        });
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Number of expired refresh families deleted
    pub expired_families_deleted: usize,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
