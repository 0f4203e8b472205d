//! Redis connection wrapper

use redis::aio::ConnectionManager;
use redis::Client;
use rserve_shared::config::CacheConfig;
use tracing::info;

use crate::InfrastructureError;

/// Reconnecting Redis connection plus the key namespace
#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
    config: CacheConfig,
}

impl RedisClient {
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        let client = Client::open(config.url.as_str())?;
        let manager = ConnectionManager::new(client).await?;

        info!(prefix = %config.key_prefix, "Redis connection established");

        Ok(Self { manager, config })
    }

    /// A handle on the shared multiplexed connection. Cheap to clone.
    pub fn get_connection(&self) -> ConnectionManager {
        self.manager.clone()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub async fn ping(&self) -> Result<bool, InfrastructureError> {
        let mut conn = self.get_connection();
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(reply == "PONG")
    }
}
