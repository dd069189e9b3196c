//! Remote store backends
//!
//! Defines the backend trait and the Gemini File API implementation.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use super::types::{GeminiUploadResponse, RemoteStoreError};
use crate::config::GeminiConfig;

/// Timeout for health pings against the remote API
const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote store trait
///
/// Implementations must be safe to call concurrently. Callers bound the
/// number of simultaneous uploads.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Short backend name, used as the dependency name in health checks
    fn backend_name(&self) -> &'static str;

    /// Upload a staged file and return its reference URI
    async fn upload(
        &self,
        path: &Path,
        display_name: &str,
        content_type: &str,
    ) -> Result<String, RemoteStoreError>;

    /// Check the remote API is reachable and usable; never fails
    async fn ping(&self) -> bool;
}

// ============================================================================
// Gemini File API
// ============================================================================

/// Gemini File API backend using the resumable upload protocol
pub struct GeminiFileStore {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiFileStore {
    pub fn new(config: &GeminiConfig) -> Self {
        if config.api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY not set. Gemini uploads will fail until it is configured.");
        }

        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn api_key(&self) -> Result<&str, RemoteStoreError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| RemoteStoreError::NotConfigured("GEMINI_API_KEY not set".to_string()))
    }

    /// Open a resumable upload session and return its upload URL
    async fn start_upload(
        &self,
        api_key: &str,
        size: usize,
        display_name: &str,
        content_type: &str,
    ) -> Result<String, RemoteStoreError> {
        let url = format!("{}/upload/v1beta/files", self.base_url);
        let body = serde_json::json!({
            "file": { "display_name": display_name }
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", size.to_string())
            .header("X-Goog-Upload-Header-Content-Type", content_type)
            .json(&body)
            .send()
            .await
            .map_err(|e| RemoteStoreError::UploadFailed(format!("Failed to start upload: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteStoreError::UploadFailed(format!(
                "Gemini returned {} on upload start: {}",
                status, body
            )));
        }

        response
            .headers()
            .get("x-goog-upload-url")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                RemoteStoreError::InvalidResponse("missing x-goog-upload-url header".to_string())
            })
    }
}

#[async_trait]
impl RemoteStore for GeminiFileStore {
    fn backend_name(&self) -> &'static str {
        "gemini"
    }

    async fn upload(
        &self,
        path: &Path,
        display_name: &str,
        content_type: &str,
    ) -> Result<String, RemoteStoreError> {
        let api_key = self.api_key()?;

        let content = tokio::fs::read(path)
            .await
            .map_err(|e| RemoteStoreError::StagedFile(format!("{}: {}", path.display(), e)))?;

        tracing::info!(
            display_name = %display_name,
            size = content.len(),
            "Uploading file to Gemini"
        );

        let upload_url = self
            .start_upload(api_key, content.len(), display_name, content_type)
            .await?;

        let response = self
            .client
            .post(&upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(content)
            .send()
            .await
            .map_err(|e| RemoteStoreError::UploadFailed(format!("Failed to send content: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteStoreError::UploadFailed(format!(
                "Gemini returned {} on upload finalize: {}",
                status, body
            )));
        }

        let uploaded: GeminiUploadResponse = response
            .json()
            .await
            .map_err(|e| RemoteStoreError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        tracing::debug!(
            name = ?uploaded.file.name,
            mime_type = ?uploaded.file.mime_type,
            size_bytes = ?uploaded.file.size_bytes,
            "Gemini file created"
        );

        Ok(uploaded.file.uri)
    }

    async fn ping(&self) -> bool {
        let Ok(api_key) = self.api_key() else {
            return false;
        };

        let url = format!("{}/v1beta/models/{}", self.base_url, self.model);
        match self
            .client
            .get(&url)
            .header("x-goog-api-key", api_key)
            .timeout(PING_TIMEOUT)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::error!("Gemini ping error: status {}", response.status());
                false
            }
            Err(e) => {
                tracing::error!("Gemini ping error: {}", e);
                false
            }
        }
    }
}

// ============================================================================
// Test double
// ============================================================================

/// Mock remote store for testing
///
/// Counts calls, tracks peak concurrency and records whether the staged
/// file existed when the upload ran.
#[cfg(test)]
#[derive(Default)]
pub struct MockRemoteStore {
    pub fail: bool,
    pub delay: Option<Duration>,
    pub available: bool,
    pub calls: std::sync::atomic::AtomicUsize,
    pub in_flight: std::sync::atomic::AtomicUsize,
    pub max_in_flight: std::sync::atomic::AtomicUsize,
    pub staged_paths: parking_lot::Mutex<Vec<(std::path::PathBuf, bool)>>,
}

#[cfg(test)]
impl MockRemoteStore {
    pub fn new() -> Self {
        Self {
            available: true,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl RemoteStore for MockRemoteStore {
    fn backend_name(&self) -> &'static str {
        "mock"
    }

    async fn upload(
        &self,
        path: &Path,
        _display_name: &str,
        _content_type: &str,
    ) -> Result<String, RemoteStoreError> {
        use std::sync::atomic::Ordering;

        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.staged_paths
            .lock()
            .push((path.to_path_buf(), path.exists()));

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail {
            return Err(RemoteStoreError::UploadFailed("mock failure".to_string()));
        }
        Ok(format!("mock://files/{}", call))
    }

    async fn ping(&self) -> bool {
        self.available
    }
}
