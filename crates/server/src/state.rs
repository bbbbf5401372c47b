use std::sync::Arc;

use concierge_core::{AutoApprove, Config, RequestOrchestrator, SanitizedConfig, Services};

/// Shared application state
pub struct AppState {
    config: Config,
    services: Services,
    orchestrator: RequestOrchestrator,
}

impl AppState {
    /// The stored orchestrator approves everything; handlers swap in a
    /// gate built from the request body.
    pub fn new(config: Config, services: Services) -> Self {
        let orchestrator = services.orchestrator(Arc::new(AutoApprove));
        Self {
            config,
            services,
            orchestrator,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn orchestrator(&self) -> &RequestOrchestrator {
        &self.orchestrator
    }
}
