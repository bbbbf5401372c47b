//! LLM client abstraction and implementations.
//!
//! Both the LLM matcher and the SQL draft generator talk to a model through
//! [`LlmClient`]. Use [`create_llm_client`] to build one from `[llm]` config.

mod anthropic;
mod ollama;
mod openai;

pub use anthropic::AnthropicClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{LlmConfig, LlmProvider};
use crate::metrics;

/// Error type for LLM operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Not configured: {0}")]
    NotConfigured(String),
}

impl LlmError {
    pub(crate) fn from_reqwest(e: reqwest::Error, timeout: Duration) -> Self {
        if e.is_timeout() {
            LlmError::Timeout(timeout)
        } else {
            LlmError::Http(e.to_string())
        }
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Request for a completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt (instructions for the model)
    pub system: Option<String>,
    /// User message
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Temperature (0.0 = deterministic, 1.0 = creative)
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            max_tokens: 1024,
            temperature: 0.0,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Response from a completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The generated text
    pub text: String,
    /// Token usage
    pub usage: LlmUsage,
    /// Model used
    pub model: String,
}

/// Trait for LLM clients.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider name (e.g., "anthropic", "openai", "ollama")
    fn provider(&self) -> &str;

    /// Model name (e.g., "claude-3-haiku-20240307")
    fn model(&self) -> &str;

    /// Send a completion request and get a text response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Cheap reachability probe used by diagnostics.
    async fn health_check(&self) -> Result<(), LlmError> {
        self.complete(CompletionRequest::new("ping").with_max_tokens(1))
            .await
            .map(|_| ())
    }
}

/// Record token usage and call outcome for one completion.
pub(crate) fn record_completion(
    provider: &str,
    started: std::time::Instant,
    result: &Result<CompletionResponse, LlmError>,
) {
    metrics::EXTERNAL_SERVICE_DURATION
        .with_label_values(&["llm", provider])
        .observe(started.elapsed().as_secs_f64());
    let status = if result.is_ok() { "success" } else { "error" };
    metrics::EXTERNAL_SERVICE_REQUESTS
        .with_label_values(&["llm", provider, status])
        .inc();
    if let Ok(response) = result {
        metrics::LLM_TOKENS
            .with_label_values(&[provider, "input"])
            .inc_by(response.usage.input_tokens as u64);
        metrics::LLM_TOKENS
            .with_label_values(&[provider, "output"])
            .inc_by(response.usage.output_tokens as u64);
    }
}

pub(crate) fn build_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

/// Build an LLM client from config.
pub fn create_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    let timeout = Duration::from_secs(config.timeout_secs as u64);
    let api_key = config.api_key.clone().filter(|k| !k.is_empty());

    let client: Arc<dyn LlmClient> = match config.provider {
        LlmProvider::Anthropic => {
            let key = api_key.ok_or_else(|| {
                LlmError::NotConfigured("llm.api_key is required for anthropic".to_string())
            })?;
            let mut client = AnthropicClient::new(key, &config.model).with_timeout(timeout);
            if let Some(base) = &config.api_base {
                client = client.with_api_base(base);
            }
            Arc::new(client)
        }
        LlmProvider::OpenAi => {
            // Self-hosted OpenAI-compatible servers often run without a key.
            if api_key.is_none() && config.api_base.is_none() {
                return Err(LlmError::NotConfigured(
                    "llm.api_key is required for open_ai without api_base".to_string(),
                ));
            }
            let mut client = OpenAiClient::new(api_key, &config.model).with_timeout(timeout);
            if let Some(base) = &config.api_base {
                client = client.with_api_base(base);
            }
            Arc::new(client)
        }
        LlmProvider::Ollama => {
            let mut client = OllamaClient::new(&config.model).with_timeout(timeout);
            if let Some(base) = &config.api_base {
                client = client.with_api_base(base);
            }
            Arc::new(client)
        }
    };

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm_config(provider: LlmProvider, api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            provider,
            model: "test-model".to_string(),
            api_key: api_key.map(String::from),
            api_base: None,
            timeout_secs: 10,
            max_tokens: 512,
        }
    }

    #[test]
    fn test_completion_request_builder() {
        let request = CompletionRequest::new("Hello")
            .with_system("You are helpful")
            .with_max_tokens(100)
            .with_temperature(0.5);

        assert_eq!(request.prompt, "Hello");
        assert_eq!(request.system, Some("You are helpful".to_string()));
        assert_eq!(request.max_tokens, 100);
        assert_eq!(request.temperature, 0.5);
    }

    #[test]
    fn test_create_anthropic_requires_key() {
        let result = create_llm_client(&llm_config(LlmProvider::Anthropic, None));
        assert!(matches!(result, Err(LlmError::NotConfigured(_))));

        let result = create_llm_client(&llm_config(LlmProvider::Anthropic, Some("")));
        assert!(matches!(result, Err(LlmError::NotConfigured(_))));
    }

    #[test]
    fn test_create_clients() {
        let client = create_llm_client(&llm_config(LlmProvider::Anthropic, Some("k"))).unwrap();
        assert_eq!(client.provider(), "anthropic");
        assert_eq!(client.model(), "test-model");

        let client = create_llm_client(&llm_config(LlmProvider::OpenAi, Some("k"))).unwrap();
        assert_eq!(client.provider(), "openai");

        let client = create_llm_client(&llm_config(LlmProvider::Ollama, None)).unwrap();
        assert_eq!(client.provider(), "ollama");
    }

    #[test]
    fn test_create_openai_compatible_without_key() {
        let mut config = llm_config(LlmProvider::OpenAi, None);
        assert!(create_llm_client(&config).is_err());

        config.api_base = Some("http://localhost:8000".to_string());
        assert!(create_llm_client(&config).is_ok());
    }
}
