//! Mock LLM client for testing.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage};

/// Mock LLM client returning a canned response.
#[derive(Debug, Default)]
pub struct MockLlmClient {
    response: Mutex<String>,
    error: Mutex<Option<String>>,
    prompts: Mutex<Vec<String>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Mutex::new(response.to_string()),
            ..Default::default()
        }
    }

    /// A client whose every call fails with an API error.
    pub fn failing(message: &str) -> Self {
        Self {
            error: Mutex::new(Some(message.to_string())),
            ..Default::default()
        }
    }

    pub fn set_response(&self, response: &str) {
        *self.response.lock().unwrap() = response.to_string();
    }

    /// User prompts received so far.
    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.prompts.lock().unwrap().push(request.prompt);

        if let Some(message) = self.error.lock().unwrap().clone() {
            return Err(LlmError::Api {
                status: 500,
                message,
            });
        }

        Ok(CompletionResponse {
            text: self.response.lock().unwrap().clone(),
            usage: LlmUsage {
                input_tokens: 200,
                output_tokens: 50,
            },
            model: "mock-model".to_string(),
        })
    }
}
