//! Liveness, readiness and full health probes.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::time::Duration;

use crate::app::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Alive,
    Ready,
    Healthy,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct DatabaseStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: Status,
    pub version: &'static str,
    pub database: DatabaseStatus,
}

#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub status: Status,
}

impl HealthReport {
    fn new(db_latency: Option<Duration>) -> Self {
        let status = if db_latency.is_some() {
            Status::Healthy
        } else {
            Status::Unhealthy
        };
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database: DatabaseStatus {
                connected: db_latency.is_some(),
                latency_ms: db_latency.map(|d| d.as_millis() as u64),
            },
        }
    }
}

/// `GET /api/health`: database round trip plus pool gauges.
///
/// Responds 503 with the same report body when the database is unreachable.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let latency = match persistence::db::ping(&state.pool).await {
        Ok(latency) => Some(latency),
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            None
        }
    };
    persistence::metrics::record_pool_metrics(&state.pool);

    let report = HealthReport::new(latency);
    let code = match report.status {
        Status::Healthy => StatusCode::OK,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(report))
}

/// `GET /api/health/live`
pub async fn live() -> Json<ProbeResponse> {
    Json(ProbeResponse {
        status: Status::Alive,
    })
}

/// `GET /api/health/ready`: 503 until the database answers.
pub async fn ready(State(state): State<AppState>) -> Result<Json<ProbeResponse>, StatusCode> {
    persistence::db::ping(&state.pool)
        .await
        .map(|_| {
            Json(ProbeResponse {
                status: Status::Ready,
            })
        })
        .map_err(|e| {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        })
}
