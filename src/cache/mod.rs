//! Key-Value Cache
//!
//! Maps content digests to remote references with a per-entry TTL.
//! Backends:
//! - Redis (production)
//! - In-memory (tests and single-process deployments)
//!
//! Connection problems surface as `CacheError::Unavailable`, never as a miss.

mod client;
mod memory;
mod redis_store;
mod store;
mod types;

pub use client::CacheClient;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use store::KeyValueStore;
pub use types::CacheError;
