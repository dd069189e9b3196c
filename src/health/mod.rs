//! Health Aggregator
//!
//! Liveness on its own, or liveness plus a parallel ping of every
//! registered dependency.

mod probe;
mod service;
mod types;

pub use probe::HealthProbe;
pub use service::HealthService;
pub use types::{DependencyStatus, HealthSnapshot, HealthStatus};
