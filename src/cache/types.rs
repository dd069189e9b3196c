//! Cache error types

use std::time::Duration;

/// Cache error types
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache store could not be reached or did not answer in time
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// Entries must always expire
    #[error("Invalid cache TTL: {0:?}")]
    InvalidTtl(Duration),
}
