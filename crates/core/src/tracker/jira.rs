//! Jira tracker backend (REST API v2, basic auth with an API token).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::TrackerConfig;
use crate::metrics;

use super::{CreatedTicket, TicketRequest, TicketTracker, TrackerError};

/// Characters of the request kept in the ticket summary.
const SUMMARY_REQUEST_CHARS: usize = 80;
/// Related assets described in the ticket.
const DESCRIPTION_MAX_ASSETS: usize = 5;
/// Columns listed per related asset.
const DESCRIPTION_MAX_COLUMNS: usize = 5;

/// Files data-product requests as Jira issues.
pub struct JiraTracker {
    client: Client,
    config: TrackerConfig,
}

#[derive(Debug, Deserialize)]
struct JiraCreateResponse {
    #[allow(dead_code)]
    id: String,
    key: String,
}

impl JiraTracker {
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| TrackerError::NotConfigured(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/2{}", self.base_url(), path)
    }

    fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.base_url(), key)
    }

    /// Issue creation payload.
    pub(crate) fn build_payload(&self, ticket: &TicketRequest) -> Value {
        let mut fields = json!({
            "project": { "key": self.config.project_key },
            "summary": build_summary(&ticket.request),
            "description": build_description(ticket),
            "issuetype": { "name": self.config.issue_type },
            "labels": self.config.labels,
        });

        if let Some(priority) = &self.config.priority {
            fields["priority"] = json!({ "name": priority });
        }

        json!({ "fields": fields })
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TrackerError> {
        match response.status() {
            s @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                Err(TrackerError::Unauthorized(s.as_u16()))
            }
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_default();
                Err(TrackerError::Api {
                    status: s.as_u16(),
                    message: body.chars().take(300).collect(),
                })
            }
            _ => Ok(response),
        }
    }

    async fn create_inner(&self, ticket: &TicketRequest) -> Result<CreatedTicket, TrackerError> {
        let payload = self.build_payload(ticket);
        let url = self.api_url("/issue");
        debug!(url = %url, project = %self.config.project_key, "Creating Jira issue");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .json(&payload)
            .send()
            .await
            .map_err(TrackerError::from_reqwest)?;
        let response = Self::check_status(response).await?;

        let created: JiraCreateResponse = response
            .json()
            .await
            .map_err(|e| TrackerError::MalformedResponse(e.to_string()))?;

        Ok(CreatedTicket {
            url: Some(self.browse_url(&created.key)),
            id: created.key,
        })
    }
}

#[async_trait]
impl TicketTracker for JiraTracker {
    fn name(&self) -> &str {
        "jira"
    }

    async fn create_ticket(&self, ticket: TicketRequest) -> Result<CreatedTicket, TrackerError> {
        let start = Instant::now();
        let result = self.create_inner(&ticket).await;

        let status = if result.is_ok() { "success" } else { "error" };
        metrics::EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["tracker", "create_issue", status])
            .inc();
        metrics::EXTERNAL_SERVICE_DURATION
            .with_label_values(&["tracker", "create_issue"])
            .observe(start.elapsed().as_secs_f64());

        if let Ok(created) = &result {
            info!(key = %created.id, "Created Jira issue");
        }
        result
    }

    async fn health_check(&self) -> Result<(), TrackerError> {
        let response = self
            .client
            .get(self.api_url("/myself"))
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .send()
            .await
            .map_err(TrackerError::from_reqwest)?;
        Self::check_status(response).await.map(|_| ())
    }
}

/// `New data product: <first 80 chars of the request>`.
pub fn build_summary(request: &str) -> String {
    let single_line = request.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut summary: String = single_line.chars().take(SUMMARY_REQUEST_CHARS).collect();
    if single_line.chars().count() > SUMMARY_REQUEST_CHARS {
        summary.push_str("...");
    }
    format!("New data product: {}", summary)
}

/// Jira wiki-markup description of a ticket request.
pub fn build_description(ticket: &TicketRequest) -> String {
    let mut description = format!("h2. User request\n\n{}\n\nh2. Related assets found\n\n", ticket.request);

    if ticket.related.is_empty() {
        description.push_str("_No related assets were found in the catalog._\n\n");
    }

    for asset in ticket.related.iter().take(DESCRIPTION_MAX_ASSETS) {
        let columns: Vec<&str> = asset
            .columns
            .iter()
            .take(DESCRIPTION_MAX_COLUMNS)
            .map(|c| c.name.as_str())
            .collect();
        let or_na = |s: &str| if s.is_empty() { "N/A".to_string() } else { s.to_string() };

        description.push_str(&format!(
            "h3. {}\n* *Database:* {}\n* *Qualified name:* {}\n* *Description:* {}\n* *Main columns:* {}\n\n",
            asset.name,
            or_na(&asset.container_name),
            asset.qualified_name,
            or_na(&asset.description),
            or_na(&columns.join(", ")),
        ));
    }

    if ticket.related.len() > DESCRIPTION_MAX_ASSETS {
        description.push_str(&format!(
            "_...and {} more related assets._\n\n",
            ticket.related.len() - DESCRIPTION_MAX_ASSETS
        ));
    }

    description.push_str("h2. Proposed SQL\n\n");
    match &ticket.draft {
        Some(sql) => description.push_str(&format!("{{code:sql}}\n{}\n{{code}}\n\n", sql)),
        None => description.push_str("_No SQL draft could be generated._\n\n"),
    }

    description.push_str(
        "h2. Next steps\n\n\
         # Review the proposed query\n\
         # Validate with the data team\n\
         # Create the table or view in the catalog\n\
         # Notify the requesting user\n\n\
         ----\n\
         _Ticket created automatically by the data request concierge._\n",
    );

    description
}
