//! Types for catalog search results.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A column of a catalog asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,
    /// Data type as reported by the catalog (e.g. "VARCHAR", "BIGINT").
    pub data_type: String,
    /// Column description, empty if the catalog has none.
    #[serde(default)]
    pub description: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A database registered in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSummary {
    pub name: String,
    /// Name of the database service that hosts it, when reported.
    #[serde(default)]
    pub service: Option<String>,
}

impl DatabaseSummary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            service: None,
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }
}

/// A data asset (table, view, dataset) surfaced by the catalog.
///
/// Built only through [`AssetRecord::new`] or `TryFrom<RawAssetRecord>`, both of
/// which reject an empty `name` or `qualified_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Short asset name (e.g. `sales_monthly`).
    pub name: String,
    /// Owning container, usually the database or schema name.
    pub container_name: String,
    /// Catalog-wide unique identifier. Used as the asset identity.
    pub qualified_name: String,
    /// Free-text description, may be empty.
    pub description: String,
    /// Columns in catalog order.
    pub columns: Vec<ColumnDescriptor>,
}

impl AssetRecord {
    /// Create a record, rejecting empty identity fields.
    pub fn new(
        name: impl Into<String>,
        container_name: impl Into<String>,
        qualified_name: impl Into<String>,
    ) -> Result<Self, MalformedCandidate> {
        Self::try_from(RawAssetRecord {
            name: Some(name.into()),
            container_name: Some(container_name.into()),
            qualified_name: Some(qualified_name.into()),
            ..Default::default()
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_columns(mut self, columns: Vec<ColumnDescriptor>) -> Self {
        self.columns = columns;
        self
    }

    /// `container.name`, or just `name` when the container is unknown.
    pub fn display_name(&self) -> String {
        if self.container_name.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.container_name, self.name)
        }
    }
}

/// A column as returned by the catalog transport, fields possibly missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawColumn {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// An asset as returned by the catalog transport, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAssetRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub container_name: Option<String>,
    #[serde(default)]
    pub qualified_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub columns: Vec<RawColumn>,
}

/// A raw record is missing a field an [`AssetRecord`] requires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed candidate: missing {field} (record: {hint})")]
pub struct MalformedCandidate {
    /// The missing or empty field.
    pub field: &'static str,
    /// Whatever identifying text the record did carry, for logs.
    pub hint: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TryFrom<RawAssetRecord> for AssetRecord {
    type Error = MalformedCandidate;

    fn try_from(raw: RawAssetRecord) -> Result<Self, Self::Error> {
        let hint = raw
            .qualified_name
            .clone()
            .or_else(|| raw.name.clone())
            .unwrap_or_else(|| "<unnamed>".to_string());

        let name = non_empty(raw.name).ok_or_else(|| MalformedCandidate {
            field: "name",
            hint: hint.clone(),
        })?;
        let qualified_name = non_empty(raw.qualified_name).ok_or(MalformedCandidate {
            field: "qualified_name",
            hint,
        })?;

        // Columns without a name carry nothing useful; keep the rest in order.
        let columns = raw
            .columns
            .into_iter()
            .filter_map(|c| {
                let name = non_empty(c.name)?;
                Some(ColumnDescriptor {
                    name,
                    data_type: c.data_type.unwrap_or_default(),
                    description: c.description.unwrap_or_default(),
                })
            })
            .collect();

        Ok(AssetRecord {
            name,
            container_name: raw.container_name.unwrap_or_default(),
            qualified_name,
            description: raw.description.unwrap_or_default(),
            columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: Option<&str>, fqn: Option<&str>) -> RawAssetRecord {
        RawAssetRecord {
            name: name.map(String::from),
            container_name: Some("sales_db".to_string()),
            qualified_name: fqn.map(String::from),
            description: None,
            columns: vec![
                RawColumn {
                    name: Some("id".to_string()),
                    data_type: Some("BIGINT".to_string()),
                    description: None,
                },
                RawColumn {
                    name: None,
                    data_type: Some("INT".to_string()),
                    description: None,
                },
                RawColumn {
                    name: Some("amount".to_string()),
                    data_type: None,
                    description: Some("Net amount".to_string()),
                },
            ],
        }
    }

    #[test]
    fn test_valid_raw_record_converts() {
        let asset = AssetRecord::try_from(raw(Some("orders"), Some("svc.sales_db.public.orders")))
            .unwrap();
        assert_eq!(asset.name, "orders");
        assert_eq!(asset.qualified_name, "svc.sales_db.public.orders");
        assert_eq!(asset.description, "");
        // Unnamed column dropped, order preserved
        let names: Vec<_> = asset.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "amount"]);
        assert_eq!(asset.columns[1].data_type, "");
        assert_eq!(asset.columns[1].description, "Net amount");
    }

    #[test]
    fn test_missing_name_is_malformed() {
        let err = AssetRecord::try_from(raw(None, Some("svc.db.t"))).unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.hint, "svc.db.t");
    }

    #[test]
    fn test_blank_qualified_name_is_malformed() {
        let err = AssetRecord::try_from(raw(Some("orders"), Some("   "))).unwrap_err();
        assert_eq!(err.field, "qualified_name");
        assert!(err.to_string().contains("qualified_name"));
    }

    #[test]
    fn test_display_name() {
        let asset = AssetRecord::new("orders", "sales_db", "svc.sales_db.orders").unwrap();
        assert_eq!(asset.display_name(), "sales_db.orders");

        let bare = AssetRecord::new("orders", "", "svc.orders").unwrap();
        assert_eq!(bare.display_name(), "orders");
    }

    #[test]
    fn test_new_rejects_empty_name() {
        assert!(AssetRecord::new("", "db", "svc.db.x").is_err());
    }
}
