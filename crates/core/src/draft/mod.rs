//! SQL draft generation.
//!
//! [`DraftGenerator`] is the raw text generator (usually an LLM).
//! [`DraftAdapter`] wraps one and guarantees the returned text is bare SQL:
//! no code fences, no surrounding whitespace, never empty.

mod llm_generator;

pub use llm_generator::{LlmDraftConfig, LlmDraftGenerator};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::catalog::AssetRecord;
use crate::llm::LlmError;

const FENCE: &str = "```";

/// Errors from a draft generator.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("draft generator failed: {0}")]
    Generator(String),

    #[error("draft generator returned no SQL")]
    Empty,
}

/// The adapter could not produce a draft. Never fatal to a resolution.
#[derive(Debug, Error)]
#[error("draft unavailable: {0}")]
pub struct DraftUnavailable(#[from] pub DraftError);

/// Produces SQL text for a request from the assets found for it.
///
/// `candidates` may be empty; generators are expected to draft from the
/// request alone in that case.
#[async_trait]
pub trait DraftGenerator: Send + Sync {
    /// Name of this generator for logging.
    fn name(&self) -> &str;

    async fn generate(&self, request: &str, candidates: &[AssetRecord])
        -> Result<String, DraftError>;
}

/// Post-processing wrapper around a [`DraftGenerator`].
#[derive(Clone)]
pub struct DraftAdapter {
    generator: Arc<dyn DraftGenerator>,
}

impl DraftAdapter {
    pub fn new(generator: Arc<dyn DraftGenerator>) -> Self {
        Self { generator }
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Draft SQL for `request`. The result contains no fence markers.
    pub async fn draft(
        &self,
        request: &str,
        candidates: &[AssetRecord],
    ) -> Result<String, DraftUnavailable> {
        let raw = self.generator.generate(request, candidates).await?;
        let sql = strip_fences(&raw);
        if sql.is_empty() {
            return Err(DraftUnavailable(DraftError::Empty));
        }
        debug!(
            generator = self.generator.name(),
            raw_len = raw.len(),
            sql_len = sql.len(),
            "Draft generated"
        );
        Ok(sql)
    }
}

/// Remove markdown code fences and surrounding whitespace.
///
/// When the text holds a fenced block, the body of the first block wins
/// (prose around it is dropped). A fence with only a language tag on its
/// opening line loses the tag. Idempotent: the output never contains a
/// fence marker.
pub fn strip_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.contains(FENCE) {
        return trimmed.to_string();
    }

    let mut segments = trimmed.split(FENCE);
    let before = segments.next().unwrap_or_default();
    let inside = segments.next().map(drop_language_tag).unwrap_or_default();

    let body = if inside.trim().is_empty() { before } else { inside };
    body.trim().to_string()
}

/// Language tags recognised on an opening fence.
const LANGUAGE_TAGS: &[&str] = &[
    "sql", "postgresql", "postgres", "psql", "mysql", "sqlite", "tsql", "plsql", "mssql",
    "bigquery", "snowflake", "hive", "sparksql",
];

/// Drop the first line of a fenced block when it is empty or a known
/// language tag written right after the fence.
fn drop_language_tag(block: &str) -> &str {
    match block.split_once('\n') {
        Some((first, rest)) if is_language_tag(first) => rest,
        _ => block,
    }
}

fn is_language_tag(line: &str) -> bool {
    let line = line.trim_end();
    line.is_empty()
        || LANGUAGE_TAGS.iter().any(|tag| line.eq_ignore_ascii_case(tag))
}
