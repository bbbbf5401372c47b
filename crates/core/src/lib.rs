pub mod catalog;
pub mod config;
pub mod draft;
pub mod llm;
pub mod matcher;
pub mod metrics;
pub mod orchestrator;
pub mod request;
pub mod resolver;
pub mod services;
pub mod testing;
pub mod tracker;

pub use catalog::{
    AssetRecord, CatalogError, CatalogSearcher, ColumnDescriptor, DatabaseSummary,
    MalformedCandidate, OpenMetadataCatalog, RawAssetRecord, RawColumn,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use draft::{strip_fences, DraftAdapter, DraftError, DraftGenerator, DraftUnavailable};
pub use llm::{create_llm_client, LlmClient, LlmError};
pub use matcher::{create_matcher, AssetMatcher, MatchVerdict, MatcherError};
pub use orchestrator::{
    AutoApprove, ConfirmationGate, OutcomeReport, Presentation, PresetGate, ReportError,
    RequestOrchestrator, SessionState,
};
pub use request::{InvalidRequest, Request};
pub use resolver::{CatalogResolver, ResolutionOutcome, ResolveError};
pub use services::{ServiceHealth, ServiceStatus, Services, ServicesError};
pub use tracker::{CreatedTicket, JiraTracker, TicketRequest, TicketTracker, TrackerError};
