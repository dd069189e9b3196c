//! Health Routes

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::config::parse_flag;
use crate::health::HealthSnapshot;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct HealthQuery {
    /// Any true flag value (`1`, `true`, `yes`, `on`) includes dependency pings
    #[serde(default)]
    pub depends: Option<String>,
}

impl HealthQuery {
    fn include_dependencies(&self) -> bool {
        self.depends
            .as_deref()
            .and_then(parse_flag)
            .unwrap_or(false)
    }
}

/// Report service health, optionally including dependencies
///
/// Always 200; the body's `status` carries the verdict.
pub async fn health_check(
    State(state): State<AppState>,
    Query(query): Query<HealthQuery>,
) -> Json<HealthSnapshot> {
    Json(state.health().check_health(query.include_dependencies()).await)
}
