//! LLM-backed SQL drafting.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::{DraftError, DraftGenerator};
use crate::catalog::AssetRecord;
use crate::config::DraftingConfig;
use crate::llm::{CompletionRequest, LlmClient};

/// Prompt limits for the LLM draft generator.
#[derive(Debug, Clone)]
pub struct LlmDraftConfig {
    /// Assets described in the prompt, most relevant first.
    pub max_assets: usize,
    /// Columns listed per asset.
    pub max_columns: usize,
    /// Maximum tokens for the generated SQL.
    pub max_tokens: u32,
}

impl Default for LlmDraftConfig {
    fn default() -> Self {
        Self {
            max_assets: 5,
            max_columns: 10,
            max_tokens: 1024,
        }
    }
}

impl LlmDraftConfig {
    pub fn from_config(drafting: &DraftingConfig, max_tokens: u32) -> Self {
        Self {
            max_assets: drafting.max_assets,
            max_columns: drafting.max_columns,
            max_tokens,
        }
    }
}

/// Drafts SQL by prompting an LLM with the request and the related schemas.
pub struct LlmDraftGenerator<C: LlmClient + ?Sized> {
    client: Arc<C>,
    config: LlmDraftConfig,
}

impl<C: LlmClient + ?Sized> LlmDraftGenerator<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            config: LlmDraftConfig::default(),
        }
    }

    pub fn with_config(client: Arc<C>, config: LlmDraftConfig) -> Self {
        Self { client, config }
    }

    fn build_system_prompt(&self) -> String {
        r#"You are an SQL and data analysis expert. Write one efficient SQL query that fulfils the user's request using the tables and columns provided.

Rules:
1. Use the appropriate JOINs when more than one table is needed
2. Add SQL comments explaining the logic
3. Use clear column aliases in the SELECT
4. Optimize for performance
5. The query must be executable
6. If no table is provided, write the best query you can from the request alone and use descriptive placeholder table names

Respond ONLY with the SQL code, without any additional explanation."#
            .to_string()
    }

    fn build_user_prompt(&self, request: &str, candidates: &[AssetRecord]) -> String {
        let mut prompt = format!("User request: {}\n\n", request);

        if candidates.is_empty() {
            prompt.push_str("No related tables were found in the catalog.\n");
        } else {
            prompt.push_str("Available table schemas:\n");
            for asset in candidates.iter().take(self.config.max_assets) {
                prompt.push_str(&format!("\nTable: {}\n", asset.display_name()));
                let description = if asset.description.is_empty() {
                    "N/A"
                } else {
                    asset.description.as_str()
                };
                prompt.push_str(&format!("Description: {}\n", description));
                prompt.push_str("Columns:\n");
                for column in asset.columns.iter().take(self.config.max_columns) {
                    let data_type = if column.data_type.is_empty() {
                        "unknown"
                    } else {
                        column.data_type.as_str()
                    };
                    let description = if column.description.is_empty() {
                        "N/A"
                    } else {
                        column.description.as_str()
                    };
                    prompt.push_str(&format!(
                        "  - {} ({}): {}\n",
                        column.name, data_type, description
                    ));
                }
            }
        }

        prompt.push_str("\nWrite the SQL query:");
        prompt
    }
}

#[async_trait]
impl<C: LlmClient + ?Sized + 'static> DraftGenerator for LlmDraftGenerator<C> {
    fn name(&self) -> &str {
        "llm"
    }

    async fn generate(
        &self,
        request: &str,
        candidates: &[AssetRecord],
    ) -> Result<String, DraftError> {
        let completion = CompletionRequest::new(self.build_user_prompt(request, candidates))
            .with_system(self.build_system_prompt())
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(0.0);

        let response = self.client.complete(completion).await?;
        debug!(
            provider = self.client.provider(),
            model = %response.model,
            output_tokens = response.usage.output_tokens,
            "LLM draft received"
        );
        Ok(response.text)
    }
}
