use async_trait::async_trait;
use serde::Serialize;

use crate::catalog::AssetRecord;

/// What the user is asked to confirm.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Presentation<'a> {
    /// An existing asset satisfies the request. Accept to use it.
    Match {
        request: &'a str,
        asset: &'a AssetRecord,
    },
    /// Nothing matched. Accept to file a ticket with the related assets and
    /// the draft.
    Escalation {
        request: &'a str,
        related: &'a [AssetRecord],
        draft: Option<&'a str>,
    },
}

impl Presentation<'_> {
    /// The yes/no question for this presentation.
    pub fn question(&self) -> &'static str {
        match self {
            Presentation::Match { .. } => "Is this the data you need?",
            Presentation::Escalation { .. } => "Create a ticket for the data team?",
        }
    }
}

/// Human (or scripted) accept/reject decision point.
///
/// Only consulted for interactive sessions. Implementations may block for
/// as long as the decision takes.
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    async fn confirm(&self, presentation: &Presentation<'_>) -> bool;
}

/// Accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

#[async_trait]
impl ConfirmationGate for AutoApprove {
    async fn confirm(&self, _presentation: &Presentation<'_>) -> bool {
        true
    }
}

/// Decisions fixed up front, e.g. from API request flags.
#[derive(Debug, Clone, Copy)]
pub struct PresetGate {
    pub accept_match: bool,
    pub escalate: bool,
}

impl PresetGate {
    pub fn new(accept_match: bool, escalate: bool) -> Self {
        Self {
            accept_match,
            escalate,
        }
    }
}

#[async_trait]
impl ConfirmationGate for PresetGate {
    async fn confirm(&self, presentation: &Presentation<'_>) -> bool {
        match presentation {
            Presentation::Match { .. } => self.accept_match,
            Presentation::Escalation { .. } => self.escalate,
        }
    }
}
