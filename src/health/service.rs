//! Health check service

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt;
use serde_json::json;

use super::probe::HealthProbe;
use super::types::{DependencyStatus, HealthSnapshot, HealthStatus};
use crate::hooks::HookRegistry;

/// Aggregates dependency pings into one health snapshot
#[derive(Clone)]
pub struct HealthService {
    inner: Arc<HealthServiceInner>,
}

struct HealthServiceInner {
    app_name: String,
    probes: Vec<Arc<dyn HealthProbe>>,
    hooks: HookRegistry,
}

impl HealthService {
    pub fn new(app_name: impl Into<String>, probes: Vec<Arc<dyn HealthProbe>>) -> Self {
        Self {
            inner: Arc::new(HealthServiceInner {
                app_name: app_name.into(),
                probes,
                hooks: HookRegistry::new("HealthService"),
            }),
        }
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.inner.hooks
    }

    pub fn app_name(&self) -> &str {
        &self.inner.app_name
    }

    /// Names of the dependencies pinged in dependency mode
    pub fn dependency_names(&self) -> Vec<String> {
        self.inner
            .probes
            .iter()
            .map(|probe| probe.name().to_string())
            .collect()
    }

    /// Report liveness, and with `include_dependencies` the reachability of
    /// every dependency. Never fails.
    pub async fn check_health(&self, include_dependencies: bool) -> HealthSnapshot {
        let arguments = json!({ "include_dependencies": include_dependencies });
        let result = self
            .inner
            .hooks
            .run("check_health", arguments, async {
                Ok::<_, Infallible>(self.snapshot(include_dependencies).await)
            })
            .await;

        match result {
            Ok(snapshot) => snapshot,
            Err(never) => match never {},
        }
    }

    async fn snapshot(&self, include_dependencies: bool) -> HealthSnapshot {
        let mut snapshot = HealthSnapshot {
            status: HealthStatus::Healthy,
            app: self.inner.app_name.clone(),
            dependencies: BTreeMap::new(),
        };

        if !include_dependencies {
            return snapshot;
        }

        let pings = self.inner.probes.iter().map(|probe| async move {
            let up = match AssertUnwindSafe(probe.ping()).catch_unwind().await {
                Ok(up) => up,
                Err(_) => {
                    tracing::error!(dependency = %probe.name(), "Health probe panicked");
                    false
                }
            };
            (probe.name().to_string(), up)
        });

        for (name, up) in join_all(pings).await {
            if !up {
                snapshot.status = HealthStatus::Unhealthy;
            }
            snapshot.dependencies.insert(name, DependencyStatus::from(up));
        }

        if !snapshot.is_healthy() {
            tracing::warn!(dependencies = ?snapshot.dependencies, "Service unhealthy");
        }

        snapshot
    }
}

impl std::fmt::Debug for HealthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthService")
            .field("app_name", &self.inner.app_name)
            .field("dependencies", &self.dependency_names())
            .finish()
    }
}
