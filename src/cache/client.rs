//! Hooked cache client used by the orchestrator

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use super::store::KeyValueStore;
use super::types::CacheError;
use crate::hooks::HookRegistry;

/// Cache client wrapping a backend store with lifecycle hooks
#[derive(Clone)]
pub struct CacheClient {
    store: Arc<dyn KeyValueStore>,
    hooks: HookRegistry,
}

impl CacheClient {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            hooks: HookRegistry::new("CacheClient"),
        }
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Name of the backing store
    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.hooks
            .run("get", json!({ "key": key }), self.store.get(key))
            .await
    }

    pub async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.hooks
            .run(
                "set",
                json!({ "key": key, "value": value, "ttl_secs": ttl.as_secs() }),
                self.store.set(key, value, ttl),
            )
            .await
    }

    pub async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.hooks
            .run("delete", json!({ "key": key }), self.store.delete(key))
            .await
    }

    /// Reachability check; never fails
    pub async fn ping(&self) -> bool {
        self.store.ping().await
    }
}

impl std::fmt::Debug for CacheClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheClient")
            .field("backend", &self.backend_name())
            .finish()
    }
}
