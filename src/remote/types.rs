//! Remote store types

use serde::Deserialize;

/// Remote store error types
#[derive(Debug, thiserror::Error)]
pub enum RemoteStoreError {
    /// Backend has no credentials or target configured
    #[error("Remote store not configured: {0}")]
    NotConfigured(String),

    /// The staged file could not be read
    #[error("Failed to read staged file: {0}")]
    StagedFile(String),

    /// The remote API rejected or failed the upload
    #[error("Remote upload failed: {0}")]
    UploadFailed(String),

    /// The remote API answered with something unexpected
    #[error("Invalid remote response: {0}")]
    InvalidResponse(String),
}

// ============================================================================
// Gemini File API wire types
// ============================================================================

/// Response body of a finalized upload
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GeminiUploadResponse {
    pub file: GeminiFile,
}

/// File resource as returned by the File API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiFile {
    /// Resource name, e.g. `files/abc-123`
    #[serde(default)]
    pub name: Option<String>,

    /// URI used to reference the file in later requests
    pub uri: String,

    #[serde(default)]
    pub mime_type: Option<String>,

    #[serde(default)]
    pub size_bytes: Option<String>,
}
