//! Remote Store
//!
//! Upload-once target for file content. The orchestrator stages content on
//! disk and hands the path to a backend; the backend returns an opaque
//! reference URI.
//!
//! Backends:
//! - Gemini File API (resumable upload)
//! - S3-compatible object storage (see `storage`)
//!
//! Backends neither cache nor retry; that policy belongs to the caller.

mod client;
mod provider;
mod types;

pub use client::RemoteStoreClient;
pub use provider::{GeminiFileStore, RemoteStore};
pub use types::RemoteStoreError;

#[cfg(test)]
pub(crate) use provider::MockRemoteStore;
