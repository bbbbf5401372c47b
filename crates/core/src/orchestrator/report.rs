use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::resolver::ResolutionOutcome;

use super::session::{ResolutionSession, SessionState};

/// Error kind and message carried by a failed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportError {
    /// `invalid_request`, `catalog_unavailable`, `ticket_creation_failed`
    /// or `internal`.
    pub kind: String,
    pub message: String,
}

impl ReportError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// What `handle_request` returns to its caller.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeReport {
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    pub request: String,
    pub session_id: Uuid,
    /// Terminal state the session ended in.
    pub state: SessionState,
    /// The resolution, when one was reached. Kept on ticket failure.
    pub outcome: Option<ResolutionOutcome>,
    /// The gate answered "no" to the presented match or escalation.
    /// Preset gates answer for their caller, so an HTTP search without
    /// `create_ticket_if_not_found` that ends unmatched reports `true`.
    pub user_declined: bool,
    pub ticket_created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ReportError>,
    pub resolved_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl OutcomeReport {
    /// Build the report of a finished session, taking its results.
    pub(crate) fn from_session(
        session: &mut ResolutionSession,
        success: bool,
        message: impl Into<String>,
        error: Option<ReportError>,
    ) -> Self {
        let user_declined = session.confirmed == Some(false);
        let (ticket_id, ticket_url) = match session.ticket.take() {
            Some(ticket) => (Some(ticket.id), ticket.url),
            None => (None, None),
        };

        Self {
            success,
            message: message.into(),
            request: std::mem::take(&mut session.request),
            session_id: session.id,
            state: session.state,
            outcome: session.outcome.take(),
            user_declined,
            ticket_created: ticket_id.is_some(),
            ticket_id,
            ticket_url,
            error,
            resolved_at: Utc::now(),
            elapsed_ms: session.started.elapsed().as_millis() as u64,
        }
    }

    pub fn error_kind(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.kind.as_str())
    }
}
