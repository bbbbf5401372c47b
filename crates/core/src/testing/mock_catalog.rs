//! Mock catalog for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::{CatalogError, CatalogSearcher, DatabaseSummary, RawAssetRecord};

/// Mock implementation of the CatalogSearcher trait.
///
/// Returns configured records, records every query, and can be told to
/// fail the next search.
#[derive(Debug, Clone, Default)]
pub struct MockCatalog {
    results: Arc<RwLock<Vec<RawAssetRecord>>>,
    databases: Arc<RwLock<Vec<DatabaseSummary>>>,
    queries: Arc<RwLock<Vec<String>>>,
    next_error: Arc<RwLock<Option<CatalogError>>>,
    unhealthy: Arc<RwLock<bool>>,
}

impl MockCatalog {
    /// Create a new mock catalog with no records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the records returned by subsequent searches.
    pub async fn set_results(&self, results: Vec<RawAssetRecord>) {
        *self.results.write().await = results;
    }

    /// Set the databases returned by `list_databases`.
    pub async fn set_databases(&self, databases: Vec<DatabaseSummary>) {
        *self.databases.write().await = databases;
    }

    /// Configure the next search to fail with the given error.
    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make health checks fail.
    pub async fn set_unhealthy(&self, unhealthy: bool) {
        *self.unhealthy.write().await = unhealthy;
    }

    /// Queries searched so far, in order.
    pub async fn recorded_queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }

    /// Get the number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.queries.read().await.len()
    }
}

#[async_trait]
impl CatalogSearcher for MockCatalog {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str) -> Result<Vec<RawAssetRecord>, CatalogError> {
        self.queries.write().await.push(query.to_string());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        Ok(self.results.read().await.clone())
    }

    async fn list_databases(&self) -> Result<Vec<DatabaseSummary>, CatalogError> {
        self.health_check().await?;
        Ok(self.databases.read().await.clone())
    }

    async fn health_check(&self) -> Result<(), CatalogError> {
        if *self.unhealthy.read().await {
            return Err(CatalogError::ConnectionFailed("mock catalog down".to_string()));
        }
        Ok(())
    }
}
