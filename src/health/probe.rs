//! Dependency probes

use async_trait::async_trait;

use crate::cache::CacheClient;
use crate::remote::RemoteStoreClient;
use crate::storage::S3Client;

/// A dependency the health check can ping
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Key under which the dependency is reported
    fn name(&self) -> &str;

    /// Whether the dependency is reachable
    async fn ping(&self) -> bool;
}

#[async_trait]
impl HealthProbe for CacheClient {
    fn name(&self) -> &str {
        self.backend_name()
    }

    async fn ping(&self) -> bool {
        CacheClient::ping(self).await
    }
}

#[async_trait]
impl HealthProbe for RemoteStoreClient {
    fn name(&self) -> &str {
        self.backend_name()
    }

    async fn ping(&self) -> bool {
        RemoteStoreClient::ping(self).await
    }
}

#[async_trait]
impl HealthProbe for S3Client {
    fn name(&self) -> &str {
        "s3"
    }

    async fn ping(&self) -> bool {
        S3Client::ping(self).await
    }
}
