//! In-memory cache store with TTL
//!
//! Expired entries are dropped when read, and `set` sweeps the whole map
//! at most once per sweep interval so keys that are never read again are
//! still reclaimed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::KeyValueStore;
use super::types::CacheError;

/// Minimum time between expiry sweeps triggered by `set`
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Cached value with its expiry
#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

impl MemoryEntry {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

#[derive(Debug)]
struct MemoryState {
    entries: HashMap<String, MemoryEntry>,
    last_sweep: Instant,
}

impl MemoryState {
    /// Drop expired entries, returning how many were removed
    fn sweep(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh());
        self.last_sweep = Instant::now();
        before - self.entries.len()
    }
}

/// Thread-safe in-memory store
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
    sweep_interval: Duration,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::with_sweep_interval(DEFAULT_SWEEP_INTERVAL)
    }

    /// Create a store whose writes sweep expired entries every `sweep_interval`
    pub fn with_sweep_interval(sweep_interval: Duration) -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryState {
                entries: HashMap::new(),
                last_sweep: Instant::now(),
            })),
            sweep_interval,
        }
    }

    /// Number of stored entries, including expired ones not yet purged
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        {
            let state = self.state.read().await;
            match state.entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.is_fresh() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Expired: remove unless it was refreshed in the meantime
        let mut state = self.state.write().await;
        if state.entries.get(key).is_some_and(|entry| !entry.is_fresh()) {
            state.entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl(ttl));
        }

        let mut state = self.state.write().await;
        if state.last_sweep.elapsed() >= self.sweep_interval {
            let removed = state.sweep();
            if removed > 0 {
                tracing::debug!(removed, "Swept expired cache entries");
            }
        }

        state.entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut state = self.state.write().await;
        Ok(state.entries.remove(key).is_some())
    }

    async fn ping(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new();
        store.set("key", "value", Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.get("key").await.unwrap(), Some("value".to_string()));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        let store = MemoryStore::new();
        store.set("key", "value", Duration::from_millis(20)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(store.get("key").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_zero_ttl_rejected() {
        let store = MemoryStore::new();
        let result = store.set("key", "value", Duration::ZERO).await;

        assert!(matches!(result, Err(CacheError::InvalidTtl(_))));
        assert_eq!(store.get("key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        store.set("key", "value", Duration::from_secs(60)).await.unwrap();

        assert!(store.delete("key").await.unwrap());
        assert!(!store.delete("key").await.unwrap());
        assert_eq!(store.get("key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_sweeps_expired_keys_never_read_again() {
        let store = MemoryStore::with_sweep_interval(Duration::from_millis(20));
        for i in 0..1000 {
            store
                .set(&format!("short-{}", i), "a", Duration::from_millis(5))
                .await
                .unwrap();
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        store.set("fresh", "b", Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("fresh").await.unwrap(), Some("b".to_string()));
    }

    #[tokio::test]
    async fn test_set_skips_sweep_within_interval() {
        let store = MemoryStore::with_sweep_interval(Duration::from_secs(60));
        store.set("short", "a", Duration::from_millis(5)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        store.set("fresh", "b", Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.len().await, 2);
        assert_eq!(store.get("short").await.unwrap(), None);
        assert_eq!(store.len().await, 1);
    }
}
