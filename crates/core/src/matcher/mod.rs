//! Exact-match judgment over catalog candidates.
//!
//! A matcher looks at the request and the candidate list and either names
//! one candidate by `qualified_name` or declines. Matchers are not trusted:
//! the resolver checks every claim against the candidates it passed in.

mod llm_matcher;
mod name_matcher;

pub use llm_matcher::{LlmMatcher, LlmMatcherConfig};
pub use name_matcher::NameMatcher;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::catalog::AssetRecord;
use crate::config::{MatchStrategy, MatcherConfig};
use crate::llm::{LlmClient, LlmError};

/// Errors from a matcher. The resolver treats all of them as "no match".
#[derive(Debug, Error)]
pub enum MatcherError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("unusable matcher response: {0}")]
    InvalidResponse(String),

    #[error("matcher not configured: {0}")]
    NotConfigured(String),
}

/// A matcher's judgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchVerdict {
    /// The candidate with this `qualified_name` satisfies the request.
    Matched(String),
    /// No single candidate is adequate.
    NoMatch,
}

/// Strategy deciding whether exactly one candidate satisfies a request.
#[async_trait]
pub trait AssetMatcher: Send + Sync {
    /// Name of this matcher for logging.
    fn name(&self) -> &str;

    /// Judge `candidates` (in catalog order) against `request`.
    async fn find_match(
        &self,
        request: &str,
        candidates: &[AssetRecord],
    ) -> Result<MatchVerdict, MatcherError>;
}

/// Runs `first`, and `second` only when `first` finds nothing.
///
/// An error from `first` is returned as is; it does not fall through.
pub struct ChainMatcher {
    name: String,
    first: Arc<dyn AssetMatcher>,
    second: Arc<dyn AssetMatcher>,
}

impl ChainMatcher {
    pub fn new(first: Arc<dyn AssetMatcher>, second: Arc<dyn AssetMatcher>) -> Self {
        Self {
            name: format!("{}_then_{}", first.name(), second.name()),
            first,
            second,
        }
    }
}

#[async_trait]
impl AssetMatcher for ChainMatcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_match(
        &self,
        request: &str,
        candidates: &[AssetRecord],
    ) -> Result<MatchVerdict, MatcherError> {
        match self.first.find_match(request, candidates).await? {
            MatchVerdict::NoMatch => {
                debug!(
                    first = self.first.name(),
                    second = self.second.name(),
                    "First matcher found nothing, trying second"
                );
                self.second.find_match(request, candidates).await
            }
            verdict => Ok(verdict),
        }
    }
}

/// Build the matcher selected by `[matcher] strategy`.
pub fn create_matcher(
    config: &MatcherConfig,
    llm: Option<Arc<dyn LlmClient>>,
) -> Result<Arc<dyn AssetMatcher>, MatcherError> {
    let llm_matcher = |client: Arc<dyn LlmClient>| -> Arc<dyn AssetMatcher> {
        Arc::new(LlmMatcher::with_config(
            client,
            LlmMatcherConfig {
                max_candidates: config.max_candidates,
                ..Default::default()
            },
        ))
    };

    match (config.strategy, llm) {
        (MatchStrategy::Name, _) => Ok(Arc::new(NameMatcher::new())),
        (MatchStrategy::Llm, Some(client)) => Ok(llm_matcher(client)),
        (MatchStrategy::NameThenLlm, Some(client)) => Ok(Arc::new(ChainMatcher::new(
            Arc::new(NameMatcher::new()),
            llm_matcher(client),
        ))),
        (strategy, None) => Err(MatcherError::NotConfigured(format!(
            "strategy {:?} requires an LLM client",
            strategy
        ))),
    }
}
