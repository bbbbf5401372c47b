//! Manual ticket creation.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use concierge_core::{
    metrics::{TICKETS_CREATED, TICKETS_FAILED},
    strip_fences, AssetRecord, CreatedTicket, TicketRequest, TrackerError,
};

use crate::state::AppState;

/// Request body for creating a ticket
#[derive(Debug, Deserialize)]
pub struct CreateTicketBody {
    pub user_request: String,
    #[serde(default)]
    pub related_assets: Vec<AssetRecord>,
    /// SQL to attach, fenced or bare.
    #[serde(default)]
    pub proposed_query: Option<String>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct TicketErrorResponse {
    pub error: String,
}

type TicketResult = Result<(StatusCode, Json<CreatedTicket>), (StatusCode, Json<TicketErrorResponse>)>;

fn error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<TicketErrorResponse>) {
    (
        status,
        Json(TicketErrorResponse {
            error: message.into(),
        }),
    )
}

/// POST /api/v1/tickets
///
/// File a ticket directly, without a resolution session.
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTicketBody>,
) -> TicketResult {
    let request = body.user_request.trim();
    if request.is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "user_request cannot be empty"));
    }

    let tracker = state
        .services()
        .tracker()
        .ok_or_else(|| error(StatusCode::SERVICE_UNAVAILABLE, "Ticket tracker not configured"))?;

    let draft = body
        .proposed_query
        .as_deref()
        .map(strip_fences)
        .filter(|sql| !sql.is_empty());

    let ticket = TicketRequest::new(request, body.related_assets, draft);
    match tracker.create_ticket(ticket).await {
        Ok(created) => {
            TICKETS_CREATED.inc();
            info!(ticket_id = %created.id, "Ticket created via API");
            Ok((StatusCode::CREATED, Json(created)))
        }
        Err(e) => {
            TICKETS_FAILED.inc();
            warn!(error = %e, "Ticket creation via API failed");
            let status = match e {
                TrackerError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            };
            Err(error(status, e.to_string()))
        }
    }
}
