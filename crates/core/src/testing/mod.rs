//! Testing utilities and mock implementations of every collaborator.
//!
//! Lets the resolver, orchestrator and HTTP layer be exercised without an
//! OpenMetadata server, an LLM or Jira.
//!
//! # Example
//!
//! ```rust,ignore
//! use concierge_core::testing::{fixtures, MockCatalog, MockTracker, ScriptedMatcher};
//!
//! let catalog = MockCatalog::new();
//! catalog.set_results(vec![fixtures::raw_asset("orders", "sales", "db.sales.orders")]).await;
//!
//! let matcher = ScriptedMatcher::matching("db.sales.orders");
//! let tracker = MockTracker::new();
//! // Build a CatalogResolver / RequestOrchestrator from them...
//! ```

mod mock_catalog;
mod mock_draft;
mod mock_llm;
mod mock_tracker;
mod scripted;

pub use mock_catalog::MockCatalog;
pub use mock_draft::{MockDraftGenerator, RecordedDraft};
pub use mock_llm::MockLlmClient;
pub use mock_tracker::MockTracker;
pub use scripted::{ScriptedGate, ScriptedMatcher};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::{AssetRecord, ColumnDescriptor, RawAssetRecord, RawColumn};

    /// A valid asset with no description or columns.
    pub fn asset(name: &str, container: &str, qualified_name: &str) -> AssetRecord {
        AssetRecord::new(name, container, qualified_name).expect("fixture asset must be valid")
    }

    /// A valid asset with `(name, type)` columns.
    pub fn asset_with_columns(
        name: &str,
        container: &str,
        qualified_name: &str,
        columns: &[(&str, &str)],
    ) -> AssetRecord {
        asset(name, container, qualified_name).with_columns(
            columns
                .iter()
                .map(|(n, t)| ColumnDescriptor::new(*n, *t))
                .collect(),
        )
    }

    /// A complete raw record as the catalog transport would return it.
    pub fn raw_asset(name: &str, container: &str, qualified_name: &str) -> RawAssetRecord {
        RawAssetRecord {
            name: Some(name.to_string()),
            container_name: Some(container.to_string()),
            qualified_name: Some(qualified_name.to_string()),
            description: Some(format!("{} table", name)),
            columns: vec![RawColumn {
                name: Some("id".to_string()),
                data_type: Some("BIGINT".to_string()),
                description: None,
            }],
        }
    }

    /// A raw record missing its qualified name.
    pub fn malformed_raw_asset(name: &str) -> RawAssetRecord {
        RawAssetRecord {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }
}
