//! Application state management
//!
//! Every client and service is built once here and handed to the router.

use std::sync::Arc;

use crate::cache::{CacheClient, CacheError, KeyValueStore, MemoryStore, RedisStore};
use crate::config::{CacheBackend, Config, RemoteBackend};
use crate::health::{HealthProbe, HealthService};
use crate::hooks::install_tracing_hooks;
use crate::remote::{GeminiFileStore, RemoteStore, RemoteStoreClient};
use crate::storage::{S3Client, StorageError};
use crate::upload::{StagingArea, UploadOrchestrator};

/// Error type for state initialization
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to initialize cache: {0}")]
    Cache(#[from] CacheError),

    #[error("Failed to initialize storage: {0}")]
    Storage(#[from] StorageError),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    orchestrator: UploadOrchestrator,
    health: HealthService,
}

impl AppState {
    /// Wire every dependency from configuration
    ///
    /// No network connection is required to succeed: Redis connects lazily
    /// and an unreachable S3 bucket is only logged.
    pub async fn build(config: Config) -> Result<Self, StateError> {
        let cache_store: Arc<dyn KeyValueStore> = match config.cache.backend {
            CacheBackend::Redis => Arc::new(RedisStore::new(&config.cache.redis)?),
            CacheBackend::Memory => Arc::new(MemoryStore::new()),
        };
        let cache = CacheClient::new(cache_store);

        let s3 = match config.s3.bucket {
            Some(_) => Some(S3Client::new(&config.s3).await?),
            None => None,
        };

        let remote_store: Arc<dyn RemoteStore> = match (config.remote.backend, &s3) {
            (RemoteBackend::Gemini, _) => Arc::new(GeminiFileStore::new(&config.remote.gemini)),
            (RemoteBackend::S3, Some(s3)) => Arc::new(s3.clone()),
            (RemoteBackend::S3, None) => {
                return Err(StorageError::NotConfigured(
                    "REMOTE_BACKEND=s3 requires S3_BUCKET_NAME".to_string(),
                )
                .into())
            }
        };
        let remote = RemoteStoreClient::new(remote_store);

        let orchestrator = UploadOrchestrator::new(
            cache.clone(),
            remote.clone(),
            StagingArea::new(&config.remote.staging_dir),
            config.upload_settings(),
        );

        let mut probes: Vec<Arc<dyn HealthProbe>> = Vec::new();
        probes.push(Arc::new(cache));
        probes.push(Arc::new(remote));
        // Storage is probed separately only when it is not already the remote store
        if let (Some(s3), RemoteBackend::Gemini) = (s3, config.remote.backend) {
            probes.push(Arc::new(s3));
        }
        let health = HealthService::new(config.server.app_name.clone(), probes);

        tracing::info!(
            cache = orchestrator.cache().backend_name(),
            remote = orchestrator.remote().backend_name(),
            dependencies = ?health.dependency_names(),
            "Services initialized"
        );

        let state = Self::from_parts(config, orchestrator, health);
        state.install_tracing_hooks();
        Ok(state)
    }

    /// Assemble state from already-built services
    pub fn from_parts(config: Config, orchestrator: UploadOrchestrator, health: HealthService) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                orchestrator,
                health,
            }),
        }
    }

    /// Register the logging hooks on every service
    pub fn install_tracing_hooks(&self) {
        install_tracing_hooks(self.orchestrator().hooks());
        install_tracing_hooks(self.orchestrator().cache().hooks());
        install_tracing_hooks(self.orchestrator().remote().hooks());
        install_tracing_hooks(self.health().hooks());
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the upload orchestrator
    pub fn orchestrator(&self) -> &UploadOrchestrator {
        &self.inner.orchestrator
    }

    /// Get the health service
    pub fn health(&self) -> &HealthService {
        &self.inner.health
    }
}
