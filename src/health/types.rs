//! Health check types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Overall service status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Reachability of one dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyStatus {
    Connected,
    Disconnected,
}

impl From<bool> for DependencyStatus {
    fn from(up: bool) -> Self {
        if up {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }
}

/// Point-in-time health of the service
///
/// Dependencies serialize as top-level keys next to `status` and `app`,
/// e.g. `{"status":"healthy","app":"upcache-server","redis":"connected"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub app: String,
    #[serde(flatten)]
    pub dependencies: BTreeMap<String, DependencyStatus>,
}

impl HealthSnapshot {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_flattens_dependencies() {
        let mut dependencies = BTreeMap::new();
        dependencies.insert("redis".to_string(), DependencyStatus::Connected);
        dependencies.insert("gemini".to_string(), DependencyStatus::Disconnected);

        let snapshot = HealthSnapshot {
            status: HealthStatus::Unhealthy,
            app: "upcache-server".to_string(),
            dependencies,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "unhealthy",
                "app": "upcache-server",
                "redis": "connected",
                "gemini": "disconnected"
            })
        );
    }

    #[test]
    fn test_liveness_snapshot_has_only_status_and_app() {
        let snapshot = HealthSnapshot {
            status: HealthStatus::Healthy,
            app: "upcache-server".to_string(),
            dependencies: BTreeMap::new(),
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 2);
        assert!(snapshot.is_healthy());
    }
}
