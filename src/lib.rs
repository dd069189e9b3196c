//! Upcache Server Library
//!
//! Content-addressed upload cache in front of a remote file API. Identical
//! bytes are uploaded once; later submissions get the cached reference.
//!
//! # Modules
//!
//! - `upload`: Digest, staging and the cache-aside upload orchestrator
//! - `cache`: Key-value cache client (Redis, in-memory)
//! - `remote`: Remote store client (Gemini File API)
//! - `storage`: S3-compatible object storage
//! - `health`: Dependency health aggregation
//! - `hooks`: Before/after/error callbacks around service operations
//! - `routes`: HTTP handlers
//!
//! The server binary is in main.rs.

pub mod cache;
pub mod config;
pub mod error;
pub mod health;
pub mod hooks;
pub mod remote;
pub mod routes;
pub mod state;
pub mod storage;
pub mod upload;

pub use config::Config;
pub use state::AppState;
