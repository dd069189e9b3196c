//! Object Storage
//!
//! S3-compatible client (AWS, MinIO). Used as the storage dependency probed
//! by the health check, and optionally as the remote store for uploads.

mod s3_client;
mod types;

pub use s3_client::S3Client;
pub use types::{ObjectMetadata, StorageError};
