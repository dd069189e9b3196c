//! Hooked remote store client

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use super::provider::RemoteStore;
use super::types::RemoteStoreError;
use crate::hooks::HookRegistry;

/// Remote store client wrapping a backend with lifecycle hooks
#[derive(Clone)]
pub struct RemoteStoreClient {
    store: Arc<dyn RemoteStore>,
    hooks: HookRegistry,
}

impl RemoteStoreClient {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            hooks: HookRegistry::new("RemoteStoreClient"),
        }
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Upload a staged file, returning the remote reference URI
    pub async fn upload(
        &self,
        path: &Path,
        display_name: &str,
        content_type: &str,
    ) -> Result<String, RemoteStoreError> {
        let arguments = json!({
            "path": path.display().to_string(),
            "display_name": display_name,
            "content_type": content_type,
        });

        self.hooks
            .run(
                "upload",
                arguments,
                self.store.upload(path, display_name, content_type),
            )
            .await
    }

    pub async fn ping(&self) -> bool {
        self.store.ping().await
    }
}

impl std::fmt::Debug for RemoteStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStoreClient")
            .field("backend", &self.backend_name())
            .finish()
    }
}
