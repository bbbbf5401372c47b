use serde::Serialize;
use std::fmt;
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

use crate::resolver::ResolutionOutcome;
use crate::tracker::CreatedTicket;

/// Lifecycle of one `handle_request` call.
///
/// ```text
/// Received -> Presenting -> Resolved
///     |            |
///     |            +--> Ticketing -> Resolved
///     +--> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Received,
    Presenting,
    Ticketing,
    Resolved,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Resolved | SessionState::Failed)
    }

    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Received, Presenting)
                | (Received, Failed)
                | (Presenting, Resolved)
                | (Presenting, Ticketing)
                | (Ticketing, Resolved)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Received => "received",
            SessionState::Presenting => "presenting",
            SessionState::Ticketing => "ticketing",
            SessionState::Resolved => "resolved",
            SessionState::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session transition {from} -> {to}")]
    InvalidTransition {
        from: SessionState,
        to: SessionState,
    },
}

/// State carried through one request. Owned by the orchestrator for the
/// duration of the call and consumed into a report at the end.
#[derive(Debug)]
pub struct ResolutionSession {
    pub(crate) id: Uuid,
    pub(crate) request: String,
    pub(crate) state: SessionState,
    pub(crate) outcome: Option<ResolutionOutcome>,
    pub(crate) confirmed: Option<bool>,
    pub(crate) ticket: Option<CreatedTicket>,
    pub(crate) started: Instant,
}

impl ResolutionSession {
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            request: request.into(),
            state: SessionState::Received,
            outcome: None,
            confirmed: None,
            ticket: None,
            started: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn outcome(&self) -> Option<&ResolutionOutcome> {
        self.outcome.as_ref()
    }

    pub fn transition(&mut self, next: SessionState) -> Result<(), SessionError> {
        if !self.state.can_transition_to(next) {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!(session = %self.id, from = %self.state, to = %next, "Session transition");
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(SessionState::Resolved.is_terminal());
        assert!(SessionState::Failed.is_terminal());
        assert!(!SessionState::Received.is_terminal());
        assert!(!SessionState::Presenting.is_terminal());
        assert!(!SessionState::Ticketing.is_terminal());
    }

    #[test]
    fn test_no_transition_leaves_terminal_state() {
        let all = [
            SessionState::Received,
            SessionState::Presenting,
            SessionState::Ticketing,
            SessionState::Resolved,
            SessionState::Failed,
        ];
        for from in [SessionState::Resolved, SessionState::Failed] {
            for to in all {
                assert!(!from.can_transition_to(to), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_no_loop_back_to_received() {
        for from in [SessionState::Presenting, SessionState::Ticketing] {
            assert!(!from.can_transition_to(SessionState::Received));
        }
        assert!(!SessionState::Ticketing.can_transition_to(SessionState::Failed));
    }

    #[test]
    fn test_session_transitions() {
        let mut session = ResolutionSession::new("monthly sales");
        assert_eq!(session.state(), SessionState::Received);

        session.transition(SessionState::Presenting).unwrap();
        session.transition(SessionState::Ticketing).unwrap();
        session.transition(SessionState::Resolved).unwrap();

        let err = session.transition(SessionState::Presenting).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid session transition resolved -> presenting"
        );
    }
}
