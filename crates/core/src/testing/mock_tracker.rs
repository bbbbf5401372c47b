//! Mock ticket tracker for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::tracker::{CreatedTicket, TicketRequest, TicketTracker, TrackerError};

/// Mock implementation of the TicketTracker trait.
///
/// Issues sequential keys (`MOCK-1`, `MOCK-2`, ...) and records every
/// ticket request. A failing tracker records the attempt and then errors.
#[derive(Debug, Clone, Default)]
pub struct MockTracker {
    tickets: Arc<RwLock<Vec<TicketRequest>>>,
    failure: Option<String>,
}

impl MockTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tracker whose every creation fails with an API error.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    /// Ticket requests received, including failed attempts.
    pub async fn received(&self) -> Vec<TicketRequest> {
        self.tickets.read().await.clone()
    }

    pub async fn attempt_count(&self) -> usize {
        self.tickets.read().await.len()
    }
}

#[async_trait]
impl TicketTracker for MockTracker {
    fn name(&self) -> &str {
        "mock"
    }

    async fn create_ticket(&self, ticket: TicketRequest) -> Result<CreatedTicket, TrackerError> {
        let mut tickets = self.tickets.write().await;
        tickets.push(ticket);

        if let Some(message) = &self.failure {
            return Err(TrackerError::Api {
                status: 500,
                message: message.clone(),
            });
        }

        let id = format!("MOCK-{}", tickets.len());
        Ok(CreatedTicket {
            url: Some(format!("https://tracker.test/browse/{}", id)),
            id,
        })
    }

    async fn health_check(&self) -> Result<(), TrackerError> {
        match &self.failure {
            Some(message) => Err(TrackerError::ConnectionFailed(message.clone())),
            None => Ok(()),
        }
    }
}
