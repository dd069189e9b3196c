//! Upload types

use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::cache::CacheError;
use crate::remote::RemoteStoreError;

// ============================================================================
// Constants
// ============================================================================

/// Default remote upload concurrency
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 5;

/// Default cache entry TTL: 47 hours
pub const DEFAULT_CACHE_TTL_SECS: u64 = 169_200;

/// Default remote upload timeout
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 120;

/// Project assigned when the caller gives none
pub const DEFAULT_PROJECT_ID: &str = "default";

/// Content type assigned when nothing better is known
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

// ============================================================================
// Request / Result
// ============================================================================

/// One file submitted for upload
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Raw file bytes
    pub content: Bytes,

    /// Name shown by the remote store
    pub display_name: String,

    /// MIME type hint
    pub content_type: String,

    /// Caller-supplied project identifier
    pub project_id: String,
}

impl UploadRequest {
    pub fn new(content: impl Into<Bytes>, display_name: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            display_name: display_name.into(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }
}

/// Outcome of an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    /// Whether the reference came from the cache
    pub cache_hit: bool,

    /// Remote reference URI
    pub reference: String,

    /// SHA-256 content digest
    pub digest: String,

    /// Project the request was made for
    pub project: String,
}

/// Orchestrator tuning
#[derive(Debug, Clone)]
pub struct UploadSettings {
    /// Maximum simultaneous remote uploads
    pub concurrency_limit: usize,

    /// Lifetime of a cache entry
    pub cache_ttl: Duration,

    /// Upper bound on a single remote upload
    pub upload_timeout: Duration,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            upload_timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Upload error types
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("File is empty")]
    EmptyContent,

    #[error("Invalid digest: {0}")]
    InvalidDigest(String),

    #[error("Upload failed: {0}")]
    UploadFailed(#[source] RemoteStoreError),

    #[error("Upload timed out after {0:?}")]
    UploadTimeout(Duration),

    #[error("Temporary file error: {0}")]
    TempResource(String),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl UploadError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::EmptyContent => StatusCode::BAD_REQUEST,
            Self::InvalidDigest(_) => StatusCode::BAD_REQUEST,
            Self::Cache(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::UploadFailed(_)
            | Self::UploadTimeout(_)
            | Self::TempResource(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyContent => "empty_content",
            Self::InvalidDigest(_) => "invalid_digest",
            Self::UploadFailed(_) => "upload_failed",
            Self::UploadTimeout(_) => "upload_timeout",
            Self::TempResource(_) => "temp_resource",
            Self::Cache(_) => "cache_unavailable",
            Self::Internal(_) => "internal_error",
        }
    }
}
