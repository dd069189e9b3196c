//! Upload Orchestrator
//!
//! Cache-aside upload: digest the content, look the digest up in the cache,
//! and only on a miss stage the content and push it to the remote store
//! under a shared concurrency bound. Successful uploads populate the cache;
//! failures never do.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use tokio::sync::Semaphore;

use super::digest::{compute_digest, is_valid_digest};
use super::staging::StagingArea;
use super::types::{UploadError, UploadRequest, UploadResult, UploadSettings};
use crate::cache::CacheClient;
use crate::hooks::HookRegistry;
use crate::remote::RemoteStoreClient;

// ============================================================================
// Upload Orchestrator
// ============================================================================

/// Coordinates cache lookups and remote uploads
#[derive(Clone)]
pub struct UploadOrchestrator {
    inner: Arc<UploadOrchestratorInner>,
}

struct UploadOrchestratorInner {
    cache: CacheClient,
    remote: RemoteStoreClient,
    staging: StagingArea,

    /// Bounds simultaneous remote uploads; may be shared across orchestrators
    semaphore: Arc<Semaphore>,

    cache_ttl: Duration,
    upload_timeout: Duration,
    hooks: HookRegistry,
}

impl UploadOrchestrator {
    /// Create an orchestrator with its own upload semaphore
    pub fn new(
        cache: CacheClient,
        remote: RemoteStoreClient,
        staging: StagingArea,
        settings: UploadSettings,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(settings.concurrency_limit.max(1)));
        Self::with_semaphore(cache, remote, staging, semaphore, settings)
    }

    /// Create an orchestrator that draws upload slots from `semaphore`
    pub fn with_semaphore(
        cache: CacheClient,
        remote: RemoteStoreClient,
        staging: StagingArea,
        semaphore: Arc<Semaphore>,
        settings: UploadSettings,
    ) -> Self {
        Self {
            inner: Arc::new(UploadOrchestratorInner {
                cache,
                remote,
                staging,
                semaphore,
                cache_ttl: settings.cache_ttl,
                upload_timeout: settings.upload_timeout,
                hooks: HookRegistry::new("UploadOrchestrator"),
            }),
        }
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.inner.hooks
    }

    pub fn cache(&self) -> &CacheClient {
        &self.inner.cache
    }

    pub fn remote(&self) -> &RemoteStoreClient {
        &self.inner.remote
    }

    pub fn staging(&self) -> &StagingArea {
        &self.inner.staging
    }

    /// Upload slots not currently in use
    pub fn available_permits(&self) -> usize {
        self.inner.semaphore.available_permits()
    }

    // ========================================================================
    // Upload
    // ========================================================================

    /// Upload a file, reusing the cached reference when the content is known
    pub async fn upload_file(&self, request: UploadRequest) -> Result<UploadResult, UploadError> {
        let arguments = json!({
            "display_name": request.display_name,
            "content_type": request.content_type,
            "project_id": request.project_id,
            "size": request.content.len(),
        });

        self.inner
            .hooks
            .run("upload_file", arguments, self.process_upload(request))
            .await
    }

    async fn process_upload(&self, request: UploadRequest) -> Result<UploadResult, UploadError> {
        if request.content.is_empty() {
            return Err(UploadError::EmptyContent);
        }

        let digest = compute_digest(&request.content);

        match self.inner.cache.get(&digest).await {
            Ok(Some(reference)) => {
                tracing::info!(digest = %digest, project = %request.project_id, "CACHE HIT");
                return Ok(UploadResult {
                    cache_hit: true,
                    reference,
                    digest,
                    project: request.project_id,
                });
            }
            Ok(None) => {}
            Err(e) => {
                // Cache outage degrades to direct upload
                tracing::warn!(digest = %digest, "Cache lookup failed, uploading directly: {}", e);
            }
        }

        let start = Instant::now();
        let reference = self.upload_to_remote(&digest, &request).await?;

        tracing::info!(
            digest = %digest,
            reference = %reference,
            elapsed_secs = start.elapsed().as_secs_f64(),
            "UPLOAD SUCCESS"
        );

        if let Err(e) = self
            .inner
            .cache
            .set(&digest, &reference, self.inner.cache_ttl)
            .await
        {
            tracing::warn!(digest = %digest, "Failed to cache upload reference: {}", e);
        }

        Ok(UploadResult {
            cache_hit: false,
            reference,
            digest,
            project: request.project_id,
        })
    }

    /// Stage and push content to the remote store under one semaphore slot
    async fn upload_to_remote(
        &self,
        digest: &str,
        request: &UploadRequest,
    ) -> Result<String, UploadError> {
        let permit = self
            .inner
            .semaphore
            .acquire()
            .await
            .map_err(|_| UploadError::Internal("Upload semaphore closed".to_string()))?;

        let staged = self
            .inner
            .staging
            .stage(digest, &request.display_name, &request.content)
            .await?;

        let outcome = tokio::time::timeout(
            self.inner.upload_timeout,
            self.inner.remote.upload(
                staged.path(),
                &request.display_name,
                &request.content_type,
            ),
        )
        .await;

        drop(permit);

        if let Err(e) = staged.cleanup().await {
            tracing::warn!(digest = %digest, "{}", e);
        }

        match outcome {
            Ok(Ok(reference)) => Ok(reference),
            Ok(Err(e)) => {
                tracing::error!(digest = %digest, "Remote upload error: {}", e);
                Err(UploadError::UploadFailed(e))
            }
            Err(_) => {
                tracing::error!(
                    digest = %digest,
                    timeout_secs = self.inner.upload_timeout.as_secs_f64(),
                    "Remote upload timed out"
                );
                Err(UploadError::UploadTimeout(self.inner.upload_timeout))
            }
        }
    }

    // ========================================================================
    // Invalidation
    // ========================================================================

    /// Drop the cached reference for a digest, returning whether one existed
    pub async fn invalidate(&self, digest: &str) -> Result<bool, UploadError> {
        if !is_valid_digest(digest) {
            return Err(UploadError::InvalidDigest(digest.to_string()));
        }

        self.inner
            .hooks
            .run("invalidate", json!({ "digest": digest }), async {
                let removed = self.inner.cache.delete(digest).await?;
                tracing::info!(digest = %digest, removed, "Cache entry invalidated");
                Ok::<bool, UploadError>(removed)
            })
            .await
    }
}

impl std::fmt::Debug for UploadOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadOrchestrator")
            .field("cache", &self.inner.cache)
            .field("remote", &self.inner.remote)
            .field("staging", &self.inner.staging)
            .field("cache_ttl", &self.inner.cache_ttl)
            .field("upload_timeout", &self.inner.upload_timeout)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
