//! LLM-backed exact-match judgment.
//!
//! The model sees the request and an indexed candidate list and answers with
//! `{"match": "<qualified_name>"}` or `{"match": null}`. A bare `NONE` is
//! accepted as a decline.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::{AssetMatcher, MatchVerdict, MatcherError};
use crate::catalog::AssetRecord;
use crate::llm::{CompletionRequest, LlmClient};

/// Configuration for the LLM matcher.
#[derive(Debug, Clone)]
pub struct LlmMatcherConfig {
    /// Maximum candidates sent to the LLM (to limit token usage).
    pub max_candidates: usize,
    /// Maximum columns listed per candidate.
    pub max_columns: usize,
    /// Maximum tokens for the LLM response.
    pub max_tokens: u32,
}

impl Default for LlmMatcherConfig {
    fn default() -> Self {
        Self {
            max_candidates: 20,
            max_columns: 8,
            max_tokens: 256,
        }
    }
}

/// LLM-powered matcher.
///
/// Generic over the LLM client so tests can pass a concrete mock while the
/// binaries pass `dyn LlmClient`.
pub struct LlmMatcher<C: LlmClient + ?Sized> {
    client: Arc<C>,
    config: LlmMatcherConfig,
}

impl<C: LlmClient + ?Sized> LlmMatcher<C> {
    /// Create a new LLM matcher.
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            config: LlmMatcherConfig::default(),
        }
    }

    /// Create with custom configuration.
    pub fn with_config(client: Arc<C>, config: LlmMatcherConfig) -> Self {
        Self { client, config }
    }

    fn build_system_prompt(&self) -> String {
        r#"You are a data catalog expert. Decide whether ONE of the listed tables satisfies the user's request EXACTLY, as it is, without joins, new columns or new aggregations.

A related table is not an exact match. If in doubt, answer no match.

Respond with JSON only:
{"match": "<qualified name of the table>"}
or
{"match": null}"#
            .to_string()
    }

    fn build_user_prompt(&self, request: &str, candidates: &[AssetRecord]) -> String {
        let mut prompt = String::new();
        prompt.push_str("USER REQUEST:\n");
        prompt.push_str(request);
        prompt.push_str("\n\nAVAILABLE TABLES:\n");

        for (i, asset) in candidates.iter().enumerate() {
            prompt.push_str(&format!(
                "\n[{}] {}\n    Qualified name: {}\n",
                i,
                asset.display_name(),
                asset.qualified_name
            ));
            if !asset.description.is_empty() {
                prompt.push_str(&format!("    Description: {}\n", asset.description));
            }
            if !asset.columns.is_empty() {
                let columns: Vec<&str> = asset
                    .columns
                    .iter()
                    .take(self.config.max_columns)
                    .map(|c| c.name.as_str())
                    .collect();
                prompt.push_str(&format!("    Columns: {}\n", columns.join(", ")));
                if asset.columns.len() > self.config.max_columns {
                    prompt.push_str(&format!(
                        "    ... and {} more columns\n",
                        asset.columns.len() - self.config.max_columns
                    ));
                }
            }
        }

        prompt.push_str("\nIs one of these tables an exact match for the request?");
        prompt
    }

    /// Turn the model's answer into a verdict.
    ///
    /// The returned name is the model's claim; it is not checked against
    /// the candidates beyond mapping a short name to its qualified name.
    fn parse_response(
        &self,
        text: &str,
        candidates: &[AssetRecord],
    ) -> Result<MatchVerdict, MatcherError> {
        let trimmed = text.trim();
        let bare = trimmed.trim_matches(|c: char| c == '\'' || c == '"' || c == '.');
        if bare.eq_ignore_ascii_case("none") {
            return Ok(MatchVerdict::NoMatch);
        }

        let json_str = match (trimmed.find('{'), trimmed.rfind('}')) {
            (Some(start), Some(end)) if start < end => &trimmed[start..=end],
            _ => {
                return Err(MatcherError::InvalidResponse(format!(
                    "expected JSON or NONE, got: {}",
                    trimmed
                )))
            }
        };

        let parsed: LlmMatchResponse = serde_json::from_str(json_str).map_err(|e| {
            MatcherError::InvalidResponse(format!("{} - Response: {}", e, trimmed))
        })?;

        match parsed.matched.map(|m| m.trim().to_string()) {
            None => Ok(MatchVerdict::NoMatch),
            Some(claim) if claim.is_empty() || claim.eq_ignore_ascii_case("none") => {
                Ok(MatchVerdict::NoMatch)
            }
            Some(claim) => Ok(MatchVerdict::Matched(resolve_claim(claim, candidates))),
        }
    }
}

/// Models sometimes answer with the short or display name. Map it to the
/// qualified name when exactly one candidate carries it.
fn resolve_claim(claim: String, candidates: &[AssetRecord]) -> String {
    if candidates.iter().any(|c| c.qualified_name == claim) {
        return claim;
    }

    let mut by_name = candidates.iter().filter(|c| {
        c.name.eq_ignore_ascii_case(&claim) || c.display_name().eq_ignore_ascii_case(&claim)
    });
    match (by_name.next(), by_name.next()) {
        (Some(only), None) => only.qualified_name.clone(),
        _ => claim,
    }
}

#[derive(Debug, Deserialize)]
struct LlmMatchResponse {
    #[serde(rename = "match", default)]
    matched: Option<String>,
}

#[async_trait]
impl<C: LlmClient + ?Sized + 'static> AssetMatcher for LlmMatcher<C> {
    fn name(&self) -> &str {
        "llm"
    }

    async fn find_match(
        &self,
        request: &str,
        candidates: &[AssetRecord],
    ) -> Result<MatchVerdict, MatcherError> {
        if candidates.is_empty() {
            return Ok(MatchVerdict::NoMatch);
        }

        let shown = &candidates[..candidates.len().min(self.config.max_candidates)];

        let completion = CompletionRequest::new(self.build_user_prompt(request, shown))
            .with_system(self.build_system_prompt())
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(0.0);

        let response = self.client.complete(completion).await?;
        debug!(
            provider = self.client.provider(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "LLM match response received"
        );

        self.parse_response(&response.text, shown)
    }
}
