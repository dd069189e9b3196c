//! Cache store trait

use std::time::Duration;

use async_trait::async_trait;

use super::types::CacheError;

/// Trait for key-value cache backends
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Short backend name, used as the dependency name in health checks
    fn backend_name(&self) -> &'static str;

    /// Get a value; absent and expired keys both return `None`
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value that expires after `ttl`
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Delete a key, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Check the store is reachable; never fails
    async fn ping(&self) -> bool;
}
