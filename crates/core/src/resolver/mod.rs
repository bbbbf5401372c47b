//! Catalog resolver.
//!
//! Turns a request into a [`ResolutionOutcome`]:
//! 1. search the catalog (failures are fatal, no retry)
//! 2. drop malformed records and duplicate identities
//! 3. ask the matcher for an exact match and verify its claim
//! 4. without a match, draft SQL from whatever was found

mod outcome;

pub use outcome::ResolutionOutcome;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{AssetRecord, CatalogError, CatalogSearcher, RawAssetRecord};
use crate::config::ResolverConfig;
use crate::draft::DraftAdapter;
use crate::matcher::{AssetMatcher, MatchVerdict};
use crate::metrics;
use crate::request::{InvalidRequest, Request};

/// Errors that end a resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    InvalidRequest(#[from] InvalidRequest),

    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(#[from] CatalogError),
}

impl ResolveError {
    /// Stable error kind for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::InvalidRequest(_) => "invalid_request",
            ResolveError::CatalogUnavailable(_) => "catalog_unavailable",
        }
    }
}

/// Decides exact match vs. no match for a request.
#[derive(Clone)]
pub struct CatalogResolver {
    catalog: Arc<dyn CatalogSearcher>,
    matcher: Arc<dyn AssetMatcher>,
    drafter: Option<DraftAdapter>,
    config: ResolverConfig,
}

impl CatalogResolver {
    pub fn new(catalog: Arc<dyn CatalogSearcher>, matcher: Arc<dyn AssetMatcher>) -> Self {
        Self {
            catalog,
            matcher,
            drafter: None,
            config: ResolverConfig::default(),
        }
    }

    /// Enable SQL drafting for unmatched requests.
    pub fn with_drafter(mut self, drafter: DraftAdapter) -> Self {
        self.drafter = Some(drafter);
        self
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogSearcher> {
        &self.catalog
    }

    pub fn drafting_enabled(&self) -> bool {
        self.drafter.is_some()
    }

    /// Validate raw request text with this resolver's length cap.
    pub fn parse_request(&self, text: &str) -> Result<Request, InvalidRequest> {
        Request::parse(text, self.config.max_request_chars)
    }

    /// Parse and resolve in one step. Blank text fails before the catalog
    /// is called.
    pub async fn resolve_text(&self, text: &str) -> Result<ResolutionOutcome, ResolveError> {
        let request = self.parse_request(text)?;
        self.resolve(&request).await
    }

    /// Resolve an accepted request.
    pub async fn resolve(&self, request: &Request) -> Result<ResolutionOutcome, ResolveError> {
        let started = Instant::now();

        let raw = self.catalog.search(request.as_str()).await.map_err(|e| {
            warn!(catalog = self.catalog.name(), error = %e, "Catalog search failed");
            e
        })?;
        let raw_count = raw.len();
        let candidates = collect_candidates(raw);
        metrics::CANDIDATES_FOUND.observe(candidates.len() as f64);
        debug!(
            raw = raw_count,
            valid = candidates.len(),
            "Catalog candidates collected"
        );

        let verdict = self.judge(request, &candidates).await;
        let outcome = match verified_match(&verdict, &candidates) {
            Some(asset) => {
                metrics::RESOLUTIONS_TOTAL
                    .with_label_values(&["matched"])
                    .inc();
                ResolutionOutcome::Matched {
                    asset: asset.clone(),
                }
            }
            None => {
                if let MatchVerdict::Matched(claim) = &verdict {
                    warn!(
                        matcher = self.matcher.name(),
                        claim = %claim,
                        "Matcher claimed an asset that was not among the candidates"
                    );
                    metrics::RESOLUTIONS_TOTAL
                        .with_label_values(&["rejected_claim"])
                        .inc();
                } else {
                    metrics::RESOLUTIONS_TOTAL
                        .with_label_values(&["unmatched"])
                        .inc();
                }

                let mut related = candidates;
                related.truncate(self.config.max_related);
                let draft = self.draft(request, &related).await;
                ResolutionOutcome::Unmatched { related, draft }
            }
        };

        metrics::RESOLUTION_DURATION.observe(started.elapsed().as_secs_f64());
        info!(
            verdict = outcome.verdict(),
            related = outcome.related().len(),
            has_draft = outcome.draft().is_some(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request resolved"
        );
        Ok(outcome)
    }

    /// Ask the matcher. Failures count as "no match".
    async fn judge(&self, request: &Request, candidates: &[AssetRecord]) -> MatchVerdict {
        if candidates.is_empty() {
            return MatchVerdict::NoMatch;
        }

        match self.matcher.find_match(request.as_str(), candidates).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(
                    matcher = self.matcher.name(),
                    error = %e,
                    "Matcher failed, treating as no match"
                );
                metrics::MATCHER_FAILURES.inc();
                MatchVerdict::NoMatch
            }
        }
    }

    /// Draft SQL for an unmatched request. Failures yield no draft.
    async fn draft(&self, request: &Request, related: &[AssetRecord]) -> Option<String> {
        let Some(drafter) = &self.drafter else {
            metrics::DRAFTS_TOTAL.with_label_values(&["disabled"]).inc();
            return None;
        };

        match drafter.draft(request.as_str(), related).await {
            Ok(sql) => {
                metrics::DRAFTS_TOTAL.with_label_values(&["success"]).inc();
                Some(sql)
            }
            Err(e) => {
                warn!(
                    generator = drafter.generator_name(),
                    error = %e,
                    "Continuing without SQL draft"
                );
                metrics::DRAFTS_TOTAL
                    .with_label_values(&["unavailable"])
                    .inc();
                None
            }
        }
    }
}

/// Convert raw records, skipping malformed ones and repeated identities.
/// Catalog order is preserved; the first record of an identity wins.
fn collect_candidates(raw: Vec<RawAssetRecord>) -> Vec<AssetRecord> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::with_capacity(raw.len());

    for record in raw {
        match AssetRecord::try_from(record) {
            Ok(asset) => {
                if seen.insert(asset.qualified_name.clone()) {
                    candidates.push(asset);
                } else {
                    debug!(qualified_name = %asset.qualified_name, "Dropping duplicate candidate");
                }
            }
            Err(e) => {
                warn!(error = %e, "Skipping malformed catalog record");
                metrics::MALFORMED_CANDIDATES.inc();
            }
        }
    }

    candidates
}

/// The candidate a verdict refers to, by `qualified_name` identity.
///
/// Independent of how the verdict was produced: a claim naming anything
/// outside `candidates` yields `None`.
pub fn verified_match<'a>(
    verdict: &MatchVerdict,
    candidates: &'a [AssetRecord],
) -> Option<&'a AssetRecord> {
    match verdict {
        MatchVerdict::Matched(claim) => candidates.iter().find(|c| &c.qualified_name == claim),
        MatchVerdict::NoMatch => None,
    }
}
