//! Session store configuration

use serde::{Deserialize, Serialize};

/// Which durable store backs refresh families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// Process-local store. Sessions are lost on restart.
    #[default]
    Memory,
    Mysql,
    Redis,
}

/// Session store and cleanup settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub backend: SessionBackend,

    /// Upper bound for a single store call, in milliseconds
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// How often expired families are purged, in seconds (0 disables cleanup)
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::Memory,
            store_timeout_ms: default_store_timeout_ms(),
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

fn default_store_timeout_ms() -> u64 {
    2_000
}

fn default_cleanup_interval() -> u64 {
    3_600
}
