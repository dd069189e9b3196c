//! Redis cache store
//!
//! One multiplexed `ConnectionManager` is created lazily on first use and
//! shared by every command. Each command is bounded by a timeout so a dead
//! Redis degrades into `CacheError::Unavailable` instead of a hung request.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tokio::sync::OnceCell;

use super::store::KeyValueStore;
use super::types::CacheError;
use crate::config::RedisConfig;

/// Redis-backed key-value store
pub struct RedisStore {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
    timeout: Duration,
}

impl RedisStore {
    /// Create a store; no connection is made until the first command
    pub fn new(config: &RedisConfig) -> Result<Self, CacheError> {
        let info = redis::ConnectionInfo {
            addr: redis::ConnectionAddr::Tcp(config.host.clone(), config.port),
            redis: redis::RedisConnectionInfo {
                db: config.db,
                password: config.password.clone(),
                ..Default::default()
            },
        };

        let client = redis::Client::open(info)
            .map_err(|e| CacheError::Unavailable(format!("Invalid Redis configuration: {}", e)))?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            timeout: config.timeout,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let connect = ConnectionManager::new(self.client.clone());
                match tokio::time::timeout(self.timeout, connect).await {
                    Ok(Ok(manager)) => {
                        tracing::info!("Redis connection established");
                        Ok(manager)
                    }
                    Ok(Err(e)) => Err(CacheError::Unavailable(format!(
                        "Redis connection failed: {}",
                        e
                    ))),
                    Err(_) => Err(CacheError::Unavailable(
                        "Redis connection timed out".to_string(),
                    )),
                }
            })
            .await?;

        Ok(manager.clone())
    }

    /// Run a command future under the configured timeout
    async fn bounded<T, F>(&self, command: &str, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CacheError::Unavailable(format!(
                "Redis {} failed: {}",
                command, e
            ))),
            Err(_) => Err(CacheError::Unavailable(format!(
                "Redis {} timed out after {:?}",
                command, self.timeout
            ))),
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    fn backend_name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        self.bounded("GET", cmd.query_async::<_, Option<String>>(&mut conn))
            .await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl(ttl));
        }
        // Redis expiry has second granularity
        let seconds = ttl.as_secs().max(1);

        let mut conn = self.connection().await?;
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg("EX").arg(seconds);
        self.bounded("SET", cmd.query_async::<_, ()>(&mut conn)).await
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.connection().await?;
        let mut cmd = redis::cmd("DEL");
        cmd.arg(key);
        let removed = self
            .bounded("DEL", cmd.query_async::<_, i64>(&mut conn))
            .await?;
        Ok(removed > 0)
    }

    async fn ping(&self) -> bool {
        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!("Redis ping error: {}", e);
                return false;
            }
        };

        let cmd = redis::cmd("PING");
        match self
            .bounded("PING", cmd.query_async::<_, String>(&mut conn))
            .await
        {
            Ok(reply) => reply == "PONG",
            Err(e) => {
                tracing::error!("Redis ping error: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> RedisConfig {
        RedisConfig {
            // Reserved TEST-NET address, nothing listens there
            host: "192.0.2.1".to_string(),
            port: 6379,
            password: None,
            db: 0,
            timeout: Duration::from_millis(100),
        }
    }

    #[test]
    fn test_new_does_not_connect() {
        let store = RedisStore::new(&unreachable_config());
        assert!(store.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_redis_is_unavailable_not_absent() {
        let store = RedisStore::new(&unreachable_config()).unwrap();

        let result = store.get("some-key").await;
        assert!(matches!(result, Err(CacheError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_unreachable_redis_ping_is_false() {
        let store = RedisStore::new(&unreachable_config()).unwrap();
        assert!(!store.ping().await);
    }

    #[tokio::test]
    async fn test_zero_ttl_rejected_before_connecting() {
        let store = RedisStore::new(&unreachable_config()).unwrap();
        let result = store.set("key", "value", Duration::ZERO).await;
        assert!(matches!(result, Err(CacheError::InvalidTtl(_))));
    }
}
