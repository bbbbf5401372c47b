//! Resolution API handler.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use concierge_core::{OutcomeReport, PresetGate};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Caller identity, only logged.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Escalate to a ticket when no exact match exists.
    #[serde(default)]
    pub create_ticket_if_not_found: bool,
}

/// HTTP status for a finished session.
pub fn status_for(report: &OutcomeReport) -> StatusCode {
    match report.error_kind() {
        None => StatusCode::OK,
        Some("invalid_request") => StatusCode::BAD_REQUEST,
        Some("catalog_unavailable") => StatusCode::SERVICE_UNAVAILABLE,
        Some("ticket_creation_failed") => StatusCode::BAD_GATEWAY,
        Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// POST /api/v1/search
///
/// Resolve a data request. Matches are accepted; unmatched requests are
/// escalated only when `create_ticket_if_not_found` is set. Leaving the
/// flag off is the caller's "no" to escalation and is reported as
/// `user_declined`.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> (StatusCode, Json<OutcomeReport>) {
    info!(
        user_id = body.user_id.as_deref().unwrap_or("anonymous"),
        create_ticket = body.create_ticket_if_not_found,
        "Search request received"
    );

    let gate = PresetGate::new(true, body.create_ticket_if_not_found);
    let report = state
        .orchestrator()
        .with_gate(Arc::new(gate))
        .handle_request(&body.query, true)
        .await;

    (status_for(&report), Json(report))
}
