//! Data catalog search abstraction.
//!
//! The resolver talks to the catalog through the [`CatalogSearcher`] trait.
//! [`OpenMetadataCatalog`] is the HTTP implementation; tests use
//! `testing::MockCatalog`.

pub(crate) mod keywords;
mod openmetadata;
mod types;

pub use keywords::{build_search_query, extract_database_filter, extract_keywords};
pub use openmetadata::OpenMetadataCatalog;
pub use types::{
    AssetRecord, ColumnDescriptor, DatabaseSummary, MalformedCandidate, RawAssetRecord, RawColumn,
};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the catalog transport. All of them make the catalog
/// unavailable for the current request.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request timed out")]
    Timeout,

    #[error("catalog connection failed: {0}")]
    ConnectionFailed(String),

    #[error("catalog rejected credentials (HTTP 401)")]
    Unauthorized,

    #[error("catalog endpoint not found: {0}")]
    NotFound(String),

    #[error("catalog API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("malformed catalog response: {0}")]
    MalformedResponse(String),

    #[error("catalog client not configured: {0}")]
    NotConfigured(String),
}

impl CatalogError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CatalogError::Timeout
        } else if e.is_connect() {
            CatalogError::ConnectionFailed(e.to_string())
        } else {
            CatalogError::Api {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                message: e.to_string(),
            }
        }
    }
}

/// Free-text search over a data catalog.
#[async_trait]
pub trait CatalogSearcher: Send + Sync {
    /// Name of this backend for logging.
    fn name(&self) -> &str;

    /// Search the catalog. Results are in the catalog's ranking order.
    ///
    /// Individual records may be incomplete; only a failure of the whole
    /// call is an error.
    async fn search(&self, query: &str) -> Result<Vec<RawAssetRecord>, CatalogError>;

    /// Databases known to the catalog. Backends without a listing return
    /// nothing.
    async fn list_databases(&self) -> Result<Vec<DatabaseSummary>, CatalogError> {
        Ok(Vec::new())
    }

    /// Check that the catalog is reachable and accepts our credentials.
    async fn health_check(&self) -> Result<(), CatalogError> {
        Ok(())
    }
}
