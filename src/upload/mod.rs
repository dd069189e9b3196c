//! Deduplicating Upload Module
//!
//! Uploads file content to the remote store at most once per unique byte
//! sequence:
//! - SHA-256 content digest as the cache key
//! - Cache-aside lookup before any remote work
//! - Bounded concurrency for remote uploads
//! - Staged temp files removed on every exit path
//!
//! Flow:
//! 1. Reject empty content
//! 2. Digest the content and look it up in the cache
//! 3. On a hit, return the cached reference
//! 4. On a miss, stage the content, upload it and cache the reference

pub mod digest;
pub mod service;
pub mod staging;
pub mod types;

pub use digest::{compute_digest, is_valid_digest};
pub use service::UploadOrchestrator;
pub use staging::{StagedFile, StagingArea};
pub use types::*;
