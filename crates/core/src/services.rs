//! Wiring of configured collaborators.
//!
//! Both binaries build the same object graph from a [`Config`]: catalog,
//! optional LLM, matcher, optional drafter and optional tracker. The graph
//! can also be assembled from injected parts for tests.

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{CatalogError, CatalogSearcher, OpenMetadataCatalog};
use crate::config::Config;
use crate::draft::{DraftAdapter, DraftGenerator, LlmDraftConfig, LlmDraftGenerator};
use crate::llm::{create_llm_client, LlmClient, LlmError};
use crate::matcher::{create_matcher, MatcherError};
use crate::orchestrator::{ConfirmationGate, RequestOrchestrator};
use crate::resolver::CatalogResolver;
use crate::tracker::{JiraTracker, TicketTracker, TrackerError};

#[derive(Debug, Error)]
pub enum ServicesError {
    #[error("no [catalog] section configured")]
    MissingCatalog,

    #[error("failed to create catalog client: {0}")]
    Catalog(#[from] CatalogError),

    #[error("failed to create LLM client: {0}")]
    Llm(#[from] LlmError),

    #[error("failed to create matcher: {0}")]
    Matcher(#[from] MatcherError),

    #[error("failed to create ticket tracker: {0}")]
    Tracker(#[from] TrackerError),
}

/// Reachability of one collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Ok,
    Unavailable,
    NotConfigured,
}

impl ServiceStatus {
    fn from_check<E: std::fmt::Display>(service: &str, result: Result<(), E>) -> Self {
        match result {
            Ok(()) => ServiceStatus::Ok,
            Err(e) => {
                warn!(service, error = %e, "Health check failed");
                ServiceStatus::Unavailable
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealth {
    pub catalog: ServiceStatus,
    pub tracker: ServiceStatus,
    pub llm: ServiceStatus,
}

impl ServiceHealth {
    /// The catalog must answer. Optional collaborators only count when
    /// configured.
    pub fn is_healthy(&self) -> bool {
        self.catalog == ServiceStatus::Ok
            && self.tracker != ServiceStatus::Unavailable
            && self.llm != ServiceStatus::Unavailable
    }
}

/// The configured collaborators and the resolver built on them.
#[derive(Clone)]
pub struct Services {
    catalog: Arc<dyn CatalogSearcher>,
    llm: Option<Arc<dyn LlmClient>>,
    tracker: Option<Arc<dyn TicketTracker>>,
    resolver: CatalogResolver,
}

impl Services {
    /// Build real HTTP clients for every configured section.
    pub fn from_config(config: &Config) -> Result<Self, ServicesError> {
        let catalog_config = config.catalog.clone().ok_or(ServicesError::MissingCatalog)?;
        info!("Initializing OpenMetadata catalog at {}", catalog_config.url);
        let catalog: Arc<dyn CatalogSearcher> = Arc::new(OpenMetadataCatalog::new(catalog_config)?);

        let llm = match &config.llm {
            Some(llm_config) => {
                info!(
                    provider = llm_config.provider.as_str(),
                    model = %llm_config.model,
                    "Initializing LLM client"
                );
                Some(create_llm_client(llm_config)?)
            }
            None => {
                info!("No LLM configured");
                None
            }
        };

        let tracker: Option<Arc<dyn TicketTracker>> = match &config.tracker {
            Some(tracker_config) => {
                info!(
                    "Initializing Jira tracker at {} (project {})",
                    tracker_config.url, tracker_config.project_key
                );
                Some(Arc::new(JiraTracker::new(tracker_config.clone())?))
            }
            None => {
                info!("No ticket tracker configured");
                None
            }
        };

        Self::from_parts(catalog, llm, tracker, config)
    }

    /// Assemble from already-built collaborators. Matcher and drafter are
    /// still chosen by `config`.
    pub fn from_parts(
        catalog: Arc<dyn CatalogSearcher>,
        llm: Option<Arc<dyn LlmClient>>,
        tracker: Option<Arc<dyn TicketTracker>>,
        config: &Config,
    ) -> Result<Self, ServicesError> {
        let matcher = create_matcher(&config.matcher, llm.clone())?;
        info!("Using matcher: {}", matcher.name());

        let mut resolver =
            CatalogResolver::new(Arc::clone(&catalog), matcher).with_config(config.resolver.clone());

        if config.drafting.enabled {
            match (&llm, &config.llm) {
                (Some(client), Some(llm_config)) => {
                    let generator = LlmDraftGenerator::with_config(
                        Arc::clone(client),
                        LlmDraftConfig::from_config(&config.drafting, llm_config.max_tokens),
                    );
                    resolver = resolver.with_drafter(DraftAdapter::new(Arc::new(generator)));
                }
                _ => warn!("SQL drafting is enabled but no [llm] is configured; drafting disabled"),
            }
        }

        Ok(Self {
            catalog,
            llm,
            tracker,
            resolver,
        })
    }

    /// Replace the draft generator, enabling drafting if it was off.
    pub fn with_draft_generator(mut self, generator: Arc<dyn DraftGenerator>) -> Self {
        self.resolver = self.resolver.with_drafter(DraftAdapter::new(generator));
        self
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogSearcher> {
        &self.catalog
    }

    pub fn resolver(&self) -> &CatalogResolver {
        &self.resolver
    }

    pub fn tracker(&self) -> Option<&Arc<dyn TicketTracker>> {
        self.tracker.as_ref()
    }

    pub fn llm(&self) -> Option<&Arc<dyn LlmClient>> {
        self.llm.as_ref()
    }

    /// An orchestrator over these services asking `gate` for confirmation.
    pub fn orchestrator(&self, gate: Arc<dyn ConfirmationGate>) -> RequestOrchestrator {
        let orchestrator = RequestOrchestrator::new(self.resolver.clone(), gate);
        match &self.tracker {
            Some(tracker) => orchestrator.with_tracker(Arc::clone(tracker)),
            None => orchestrator,
        }
    }

    /// Check every configured collaborator concurrently.
    pub async fn health(&self) -> ServiceHealth {
        let catalog = async {
            ServiceStatus::from_check("catalog", self.catalog.health_check().await)
        };
        let tracker = async {
            match &self.tracker {
                Some(t) => ServiceStatus::from_check("tracker", t.health_check().await),
                None => ServiceStatus::NotConfigured,
            }
        };
        let llm = async {
            match &self.llm {
                Some(c) => ServiceStatus::from_check("llm", c.health_check().await),
                None => ServiceStatus::NotConfigured,
            }
        };

        let (catalog, tracker, llm) = tokio::join!(catalog, tracker, llm);
        ServiceHealth {
            catalog,
            tracker,
            llm,
        }
    }
}
