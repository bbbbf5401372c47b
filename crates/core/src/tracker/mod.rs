//! Work-item tracker abstraction.
//!
//! When no asset satisfies a request and the user agrees, the orchestrator
//! files a [`TicketRequest`] through a [`TicketTracker`].

mod jira;

pub use jira::{build_description, build_summary, JiraTracker};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::AssetRecord;

/// Errors from the tracker transport.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("tracker request timed out")]
    Timeout,

    #[error("tracker connection failed: {0}")]
    ConnectionFailed(String),

    #[error("tracker rejected credentials (HTTP {0})")]
    Unauthorized(u16),

    #[error("tracker API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("malformed tracker response: {0}")]
    MalformedResponse(String),

    #[error("tracker not configured: {0}")]
    NotConfigured(String),
}

impl TrackerError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TrackerError::Timeout
        } else if e.is_connect() {
            TrackerError::ConnectionFailed(e.to_string())
        } else {
            TrackerError::Api {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                message: e.to_string(),
            }
        }
    }
}

/// Everything a ticket for an unmet data request carries.
///
/// Built once, after the user confirmed escalation, and consumed by
/// [`TicketTracker::create_ticket`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRequest {
    /// The user's request text.
    pub request: String,
    /// Assets found for the request, possibly none.
    pub related: Vec<AssetRecord>,
    /// Proposed SQL, when one could be drafted.
    pub draft: Option<String>,
}

impl TicketRequest {
    pub fn new(request: impl Into<String>, related: Vec<AssetRecord>, draft: Option<String>) -> Self {
        Self {
            request: request.into(),
            related,
            draft,
        }
    }
}

/// A ticket the tracker accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTicket {
    /// Tracker identifier (e.g. `DATA-123`).
    pub id: String,
    /// Browser link, when the tracker provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Creates trackable work items.
#[async_trait]
pub trait TicketTracker: Send + Sync {
    /// Name of this tracker for logging.
    fn name(&self) -> &str;

    /// File one ticket. Not retried by callers.
    async fn create_ticket(&self, ticket: TicketRequest) -> Result<CreatedTicket, TrackerError>;

    /// Check that the tracker is reachable and accepts our credentials.
    async fn health_check(&self) -> Result<(), TrackerError> {
        Ok(())
    }
}
