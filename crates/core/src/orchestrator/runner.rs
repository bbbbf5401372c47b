//! Request orchestrator implementation.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::metrics;
use crate::resolver::{CatalogResolver, ResolutionOutcome, ResolveError};
use crate::tracker::{CreatedTicket, TicketRequest, TicketTracker, TrackerError};

use super::gate::{ConfirmationGate, Presentation};
use super::report::{OutcomeReport, ReportError};
use super::session::{ResolutionSession, SessionError, SessionState};

/// Drives one request from resolution through confirmation to an optional
/// ticket.
///
/// Sessions share nothing but the collaborators, so one orchestrator can
/// serve concurrent requests.
#[derive(Clone)]
pub struct RequestOrchestrator {
    resolver: CatalogResolver,
    tracker: Option<Arc<dyn TicketTracker>>,
    gate: Arc<dyn ConfirmationGate>,
}

impl RequestOrchestrator {
    pub fn new(resolver: CatalogResolver, gate: Arc<dyn ConfirmationGate>) -> Self {
        Self {
            resolver,
            tracker: None,
            gate,
        }
    }

    /// Tracker used for escalations. Without one, an accepted escalation
    /// ends in `ticket_creation_failed`.
    pub fn with_tracker(mut self, tracker: Arc<dyn TicketTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// A copy of this orchestrator asking `gate` instead.
    pub fn with_gate(&self, gate: Arc<dyn ConfirmationGate>) -> Self {
        Self {
            resolver: self.resolver.clone(),
            tracker: self.tracker.clone(),
            gate,
        }
    }

    pub fn resolver(&self) -> &CatalogResolver {
        &self.resolver
    }

    pub fn tracker(&self) -> Option<&Arc<dyn TicketTracker>> {
        self.tracker.as_ref()
    }

    /// Handle one request end to end.
    ///
    /// With `interactive == false` the gate is never consulted and every
    /// confirmation counts as accepted.
    pub async fn handle_request(&self, text: &str, interactive: bool) -> OutcomeReport {
        let mut session = ResolutionSession::new(text.trim());
        info!(session = %session.id(), interactive, "Handling data request");

        match self.run(&mut session, text, interactive).await {
            Ok(report) => report,
            Err(e) => {
                error!(session = %session.id(), error = %e, "Session state machine violated");
                metrics::REQUESTS_TOTAL.with_label_values(&["failed"]).inc();
                let message = e.to_string();
                OutcomeReport::from_session(
                    &mut session,
                    false,
                    message.clone(),
                    Some(ReportError::new("internal", message)),
                )
            }
        }
    }

    async fn run(
        &self,
        session: &mut ResolutionSession,
        text: &str,
        interactive: bool,
    ) -> Result<OutcomeReport, SessionError> {
        let resolved = match self.resolver.parse_request(text) {
            Ok(request) => {
                session.request = request.as_str().to_string();
                self.resolver.resolve(&request).await
            }
            Err(e) => Err(ResolveError::from(e)),
        };

        let outcome = match resolved {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(session = %session.id(), kind = e.kind(), error = %e, "Resolution failed");
                session.transition(SessionState::Failed)?;
                metrics::REQUESTS_TOTAL.with_label_values(&["failed"]).inc();
                let message = e.to_string();
                return Ok(OutcomeReport::from_session(
                    session,
                    false,
                    message.clone(),
                    Some(ReportError::new(e.kind(), message)),
                ));
            }
        };

        session.transition(SessionState::Presenting)?;
        let accepted = self.confirm(&session.request, &outcome, interactive).await;
        session.confirmed = Some(accepted);
        session.outcome = Some(outcome);

        let escalation = match &session.outcome {
            Some(ResolutionOutcome::Unmatched { related, draft }) => {
                Some((related.clone(), draft.clone()))
            }
            _ => None,
        };
        let Some((related, draft)) = escalation else {
            // Matched: accept or reject, both end here.
            session.transition(SessionState::Resolved)?;
            let message = match session.outcome.as_ref().and_then(|o| o.matched_asset()) {
                Some(asset) if accepted => {
                    format!("Found an existing asset for your request: {}", asset.display_name())
                }
                _ => "Match declined; submit a new request to search again".to_string(),
            };
            let label = if accepted { "matched" } else { "match_declined" };
            metrics::REQUESTS_TOTAL.with_label_values(&[label]).inc();
            return Ok(OutcomeReport::from_session(session, true, message, None));
        };

        if !accepted {
            session.transition(SessionState::Resolved)?;
            metrics::REQUESTS_TOTAL
                .with_label_values(&["escalation_declined"])
                .inc();
            return Ok(OutcomeReport::from_session(
                session,
                true,
                "No exact match found; no ticket was created",
                None,
            ));
        }

        let ticket = TicketRequest::new(session.request.clone(), related, draft);
        session.transition(SessionState::Ticketing)?;
        let created = self.create_ticket(ticket).await;
        session.transition(SessionState::Resolved)?;

        match created {
            Ok(created) => {
                metrics::TICKETS_CREATED.inc();
                metrics::REQUESTS_TOTAL
                    .with_label_values(&["ticket_created"])
                    .inc();
                info!(session = %session.id(), ticket = %created.id, "Ticket created");
                let message = format!("Ticket {} created for the data team", created.id);
                session.ticket = Some(created);
                Ok(OutcomeReport::from_session(session, true, message, None))
            }
            Err(e) => {
                metrics::TICKETS_FAILED.inc();
                metrics::REQUESTS_TOTAL
                    .with_label_values(&["ticket_failed"])
                    .inc();
                warn!(session = %session.id(), error = %e, "Ticket creation failed");
                let message = format!("Could not create the ticket: {}", e);
                Ok(OutcomeReport::from_session(
                    session,
                    false,
                    message,
                    Some(ReportError::new("ticket_creation_failed", e.to_string())),
                ))
            }
        }
    }

    async fn confirm(&self, request: &str, outcome: &ResolutionOutcome, interactive: bool) -> bool {
        if !interactive {
            debug!("Non-interactive session, auto-accepting");
            return true;
        }

        let presentation = match outcome {
            ResolutionOutcome::Matched { asset } => Presentation::Match { request, asset },
            ResolutionOutcome::Unmatched { related, draft } => Presentation::Escalation {
                request,
                related,
                draft: draft.as_deref(),
            },
        };
        let accepted = self.gate.confirm(&presentation).await;
        debug!(question = presentation.question(), accepted, "Confirmation received");
        accepted
    }

    async fn create_ticket(&self, ticket: TicketRequest) -> Result<CreatedTicket, TrackerError> {
        match &self.tracker {
            Some(tracker) => tracker.create_ticket(ticket).await,
            None => Err(TrackerError::NotConfigured(
                "no [tracker] section configured".to_string(),
            )),
        }
    }
}
