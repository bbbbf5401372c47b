//! Offline name heuristic.
//!
//! Works without an LLM: a candidate matches when the significant words of
//! the request are exactly the words of the asset name, in any order
//! (`monthly sales` and `sales_monthly`). Anything looser is left to the
//! LLM matcher or to a human.

use async_trait::async_trait;
use std::collections::BTreeSet;
use tracing::debug;

use super::{AssetMatcher, MatchVerdict, MatcherError};
use crate::catalog::keywords::STOP_WORDS;
use crate::catalog::AssetRecord;

/// Request words that never appear in asset names.
const FILLER_WORDS: &[&str] = &[
    "a", "an", "the", "of", "by", "per", "for", "in", "and", "all", "my", "me", "i", "get",
    "list", "report", "dataset", "view",
];

/// Heuristic matcher comparing word sets.
#[derive(Debug, Default)]
pub struct NameMatcher;

impl NameMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Lowercased words with a trailing plural `s` removed.
    fn normalize_word(word: &str) -> String {
        let lower = word.to_lowercase();
        if lower.chars().count() > 3 && lower.ends_with('s') && !lower.ends_with("ss") {
            lower[..lower.len() - 1].to_string()
        } else {
            lower
        }
    }

    fn words(text: &str) -> impl Iterator<Item = &str> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
    }

    fn request_tokens(request: &str) -> BTreeSet<String> {
        Self::words(request)
            .filter(|w| {
                let lower = w.to_lowercase();
                !STOP_WORDS.contains(&lower.as_str()) && !FILLER_WORDS.contains(&lower.as_str())
            })
            .map(Self::normalize_word)
            .collect()
    }

    fn name_tokens(name: &str) -> BTreeSet<String> {
        Self::words(name).map(Self::normalize_word).collect()
    }
}

#[async_trait]
impl AssetMatcher for NameMatcher {
    fn name(&self) -> &str {
        "name"
    }

    async fn find_match(
        &self,
        request: &str,
        candidates: &[AssetRecord],
    ) -> Result<MatchVerdict, MatcherError> {
        let wanted = Self::request_tokens(request);
        if wanted.is_empty() {
            return Ok(MatchVerdict::NoMatch);
        }

        let hits: Vec<&AssetRecord> = candidates
            .iter()
            .filter(|c| Self::name_tokens(&c.name) == wanted)
            .collect();

        match hits.as_slice() {
            [only] => Ok(MatchVerdict::Matched(only.qualified_name.clone())),
            [] => Ok(MatchVerdict::NoMatch),
            many => {
                debug!(
                    count = many.len(),
                    "Several assets share the requested name, leaving undecided"
                );
                Ok(MatchVerdict::NoMatch)
            }
        }
    }
}
