//! Storage types

use serde::Serialize;

/// Metadata about a stored object
#[derive(Debug, Clone, Serialize)]
pub struct ObjectMetadata {
    pub key: String,
    pub size: i64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
}

/// Storage-specific errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage not configured: {0}")]
    NotConfigured(String),

    #[error("S3 SDK error: {0}")]
    SdkError(String),

    #[error("Failed to read local file: {0}")]
    LocalFile(String),
}
