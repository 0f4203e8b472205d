//! Cache module for Redis-backed session storage
//!
//! This module provides the Redis connection wrapper and a `SessionStore`
//! that keeps refresh families in Redis hashes.

pub mod redis_client;
pub mod session_store;


pub use redis_client::RedisClient;
pub use session_store::RedisSessionStore;

// Re-export commonly used types
pub use rserve_shared::config::CacheConfig;
