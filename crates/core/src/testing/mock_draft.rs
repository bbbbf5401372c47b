//! Mock SQL draft generator for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::AssetRecord;
use crate::draft::{DraftError, DraftGenerator};

/// One call made to the mock generator.
#[derive(Debug, Clone)]
pub struct RecordedDraft {
    pub request: String,
    pub candidates: Vec<AssetRecord>,
}

/// Mock implementation of the DraftGenerator trait.
#[derive(Debug, Clone, Default)]
pub struct MockDraftGenerator {
    response: String,
    error: Option<String>,
    calls: Arc<RwLock<Vec<RecordedDraft>>>,
}

impl MockDraftGenerator {
    /// Generator returning `response` verbatim (fences included).
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            ..Default::default()
        }
    }

    /// Generator whose every call fails.
    pub fn failing(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub async fn calls(&self) -> Vec<RecordedDraft> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl DraftGenerator for MockDraftGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        request: &str,
        candidates: &[AssetRecord],
    ) -> Result<String, DraftError> {
        self.calls.write().await.push(RecordedDraft {
            request: request.to_string(),
            candidates: candidates.to_vec(),
        });

        match &self.error {
            Some(message) => Err(DraftError::Generator(message.clone())),
            None => Ok(self.response.clone()),
        }
    }
}
