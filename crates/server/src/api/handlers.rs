use axum::{extract::State, http::header, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use concierge_core::{SanitizedConfig, ServiceStatus};

use crate::metrics::encode_metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `healthy` when the catalog answers and no configured optional
    /// service is down, `degraded` otherwise.
    pub status: String,
    pub services: ServicesHealth,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct ServicesHealth {
    pub api: ServiceStatus,
    pub catalog: ServiceStatus,
    pub tracker: ServiceStatus,
    pub llm: ServiceStatus,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let health = state.services().health().await;
    let status = if health.is_healthy() {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        services: ServicesHealth {
            api: ServiceStatus::Ok,
            catalog: health.catalog,
            tracker: health.tracker,
            llm: health.llm,
        },
        timestamp: Utc::now(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
