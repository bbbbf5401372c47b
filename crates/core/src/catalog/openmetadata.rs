//! OpenMetadata catalog backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::CatalogConfig;
use crate::metrics;

use super::keywords::{build_search_query, extract_database_filter};
use super::{CatalogError, CatalogSearcher, DatabaseSummary, RawAssetRecord, RawColumn};

/// Page size used by the fallback table listing.
const FALLBACK_LIST_LIMIT: u32 = 50;

const DATABASE_LIST_LIMIT: u32 = 100;

/// OpenMetadata search client.
///
/// Searches the table index with keywords extracted from the request. When
/// the index returns nothing, falls back to listing tables directly.
pub struct OpenMetadataCatalog {
    client: Client,
    config: CatalogConfig,
}

impl OpenMetadataCatalog {
    /// Create a new client. Fails only if the HTTP client cannot be built.
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| CatalogError::NotConfigured(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn build_search_url(&self, query: &str) -> String {
        format!(
            "{}/api/v1/search/query?q={}&index={}&from=0&size={}",
            self.base_url(),
            urlencoding::encode(query),
            urlencoding::encode(&self.config.search_index),
            self.config.page_size
        )
    }

    fn build_list_url(&self, database: Option<&str>) -> String {
        let mut url = format!(
            "{}/api/v1/tables?limit={}&fields=columns",
            self.base_url(),
            FALLBACK_LIST_LIMIT
        );
        if let Some(db) = database {
            url.push_str(&format!("&database={}", urlencoding::encode(db)));
        }
        url
    }

    fn build_databases_url(&self) -> String {
        format!("{}/api/v1/databases?limit={}", self.base_url(), DATABASE_LIST_LIMIT)
    }

    async fn get_json(&self, url: &str, operation: &str) -> Result<Value, CatalogError> {
        let start = Instant::now();
        let result = self.get_json_inner(url).await;

        let status = if result.is_ok() { "success" } else { "error" };
        metrics::EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["catalog", operation, status])
            .inc();
        metrics::EXTERNAL_SERVICE_DURATION
            .with_label_values(&["catalog", operation])
            .observe(start.elapsed().as_secs_f64());

        result
    }

    async fn get_json_inner(&self, url: &str) -> Result<Value, CatalogError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.token)
            .header("content-type", "application/json")
            .send()
            .await
            .map_err(CatalogError::from_reqwest)?;

        match response.status() {
            StatusCode::UNAUTHORIZED => return Err(CatalogError::Unauthorized),
            StatusCode::NOT_FOUND => return Err(CatalogError::NotFound(self.base_url().to_string())),
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(CatalogError::Api {
                    status: s.as_u16(),
                    message: body.chars().take(200).collect(),
                });
            }
            _ => {}
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::MalformedResponse(e.to_string()))
    }

    /// List tables directly, used when the search index finds nothing.
    async fn list_tables(&self, database: Option<&str>) -> Result<Vec<Value>, CatalogError> {
        let url = self.build_list_url(database);
        debug!(url = %url, "Listing catalog tables");

        let body = self.get_json(&url, "list").await?;
        data_array(body, "table listing")
    }
}

/// Items of an entity listing, either `{"data": [...]}` or a bare array.
pub(crate) fn data_array(body: Value, what: &str) -> Result<Vec<Value>, CatalogError> {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(CatalogError::MalformedResponse(format!("{} has no data array", what))),
        },
        Value::Array(items) => Ok(items),
        _ => Err(CatalogError::MalformedResponse(format!("unexpected {} shape", what))),
    }
}

/// Map a database entity. Entries without a name are skipped.
pub(crate) fn to_database_summary(entity: &Value) -> Option<DatabaseSummary> {
    let name = str_field(entity, "name").filter(|n| !n.trim().is_empty())?;
    let service = entity
        .get("service")
        .and_then(|s| s.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string);
    Some(DatabaseSummary { name, service })
}

/// Pull the hit list out of a search response.
///
/// Accepts the Elasticsearch shape (`hits.hits`) and the flat `data` shape.
/// Each hit is unwrapped to its `_source` when present.
pub(crate) fn extract_hits(body: Value) -> Result<Vec<Value>, CatalogError> {
    let hits = match body {
        Value::Object(mut map) => {
            if let Some(Value::Object(mut hits)) = map.remove("hits") {
                match hits.remove("hits") {
                    Some(Value::Array(items)) => items,
                    _ => {
                        return Err(CatalogError::MalformedResponse(
                            "hits object without hits array".to_string(),
                        ))
                    }
                }
            } else if let Some(Value::Array(items)) = map.remove("data") {
                items
            } else {
                return Err(CatalogError::MalformedResponse(
                    "response has neither hits nor data".to_string(),
                ));
            }
        }
        _ => {
            return Err(CatalogError::MalformedResponse(
                "response is not a JSON object".to_string(),
            ))
        }
    };

    Ok(hits.into_iter().map(unwrap_source).collect())
}

fn unwrap_source(hit: Value) -> Value {
    match hit {
        Value::Object(mut map) => match map.remove("_source") {
            Some(source) => source,
            None => Value::Object(map),
        },
        other => other,
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Name of the database an entity belongs to. OpenMetadata returns either an
/// entity reference object or, in older versions, a plain string.
fn database_name(source: &Value) -> Option<String> {
    match source.get("database") {
        Some(Value::Object(db)) => db.get("name").and_then(Value::as_str).map(str::to_string),
        Some(Value::String(db)) => Some(db.clone()),
        _ => source
            .get("databaseSchema")
            .and_then(|s| s.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

/// Map an OpenMetadata table entity to a raw record. Never fails: missing
/// fields stay `None` and are judged later.
pub(crate) fn to_raw_record(source: &Value) -> RawAssetRecord {
    let columns = source
        .get("columns")
        .and_then(Value::as_array)
        .map(|cols| {
            cols.iter()
                .map(|c| RawColumn {
                    name: str_field(c, "name"),
                    data_type: str_field(c, "dataType"),
                    description: str_field(c, "description"),
                })
                .collect()
        })
        .unwrap_or_default();

    RawAssetRecord {
        name: str_field(source, "name"),
        container_name: database_name(source),
        qualified_name: str_field(source, "fullyQualifiedName"),
        description: str_field(source, "description"),
        columns,
    }
}

/// Keep only hits belonging to the named database (partial, case-insensitive).
pub(crate) fn filter_by_database(hits: &[Value], database: &str) -> Vec<Value> {
    let wanted = database.to_lowercase();
    let words: Vec<&str> = wanted.split_whitespace().collect();

    hits.iter()
        .filter(|hit| {
            let db = database_name(hit).unwrap_or_default().to_lowercase();
            let db_fqn = hit
                .get("database")
                .and_then(|d| d.get("fullyQualifiedName"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_lowercase();
            let fqn = str_field(hit, "fullyQualifiedName")
                .unwrap_or_default()
                .to_lowercase();

            db.contains(&wanted)
                || db_fqn.contains(&wanted)
                || fqn.contains(&wanted)
                || words.iter().any(|w| db.contains(w) || fqn.contains(w))
        })
        .cloned()
        .collect()
}

#[async_trait]
impl CatalogSearcher for OpenMetadataCatalog {
    fn name(&self) -> &str {
        "openmetadata"
    }

    async fn search(&self, query: &str) -> Result<Vec<RawAssetRecord>, CatalogError> {
        let search_query = build_search_query(query);
        let database = extract_database_filter(query);
        debug!(query = %search_query, database = ?database, "Searching OpenMetadata");

        let body = self.get_json(&self.build_search_url(&search_query), "search").await?;
        let mut hits = extract_hits(body)?;

        if hits.is_empty() {
            info!("Search index returned no tables, falling back to table listing");
            hits = self.list_tables(database.as_deref()).await?;
        }

        if let Some(db) = &database {
            let filtered = filter_by_database(&hits, db);
            if filtered.is_empty() {
                warn!(database = %db, "No tables in requested database, keeping all results");
            } else {
                debug!(database = %db, kept = filtered.len(), "Filtered results by database");
                hits = filtered;
            }
        }

        metrics::SEARCH_RESULTS.observe(hits.len() as f64);
        Ok(hits.iter().map(to_raw_record).collect())
    }

    async fn list_databases(&self) -> Result<Vec<DatabaseSummary>, CatalogError> {
        let body = self.get_json(&self.build_databases_url(), "databases").await?;
        let databases: Vec<DatabaseSummary> = data_array(body, "database listing")?
            .iter()
            .filter_map(to_database_summary)
            .collect();
        debug!(count = databases.len(), "Listed catalog databases");
        Ok(databases)
    }

    async fn health_check(&self) -> Result<(), CatalogError> {
        let url = format!("{}/api/v1/system/version", self.base_url());
        self.get_json(&url, "health").await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config() -> CatalogConfig {
        CatalogConfig {
            url: "http://localhost:8585/".to_string(),
            token: "jwt".to_string(),
            timeout_secs: 5,
            search_index: "table_search_index".to_string(),
            page_size: 20,
        }
    }

    #[test]
    fn test_build_search_url_encodes_query() {
        let catalog = OpenMetadataCatalog::new(test_config()).unwrap();
        let url = catalog.build_search_url("sale sales");
        assert_eq!(
            url,
            "http://localhost:8585/api/v1/search/query?q=sale%20sales&index=table_search_index&from=0&size=20"
        );
    }

    #[test]
    fn test_build_list_url_with_database() {
        let catalog = OpenMetadataCatalog::new(test_config()).unwrap();
        let url = catalog.build_list_url(Some("MySQL Test"));
        assert!(url.ends_with("&database=MySQL%20Test"));
    }

    #[test]
    fn test_extract_hits_elasticsearch_shape() {
        let body = json!({
            "hits": { "hits": [
                { "_source": { "name": "orders", "fullyQualifiedName": "svc.db.s.orders" } },
                { "_source": { "name": "customers" } }
            ]}
        });
        let hits = extract_hits(body).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0]["name"], "orders");
    }

    #[test]
    fn test_extract_hits_data_shape() {
        let body = json!({ "data": [ { "name": "orders" } ] });
        let hits = extract_hits(body).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_extract_hits_rejects_unknown_shape() {
        assert!(matches!(
            extract_hits(json!({ "status": "ok" })),
            Err(CatalogError::MalformedResponse(_))
        ));
        assert!(matches!(
            extract_hits(json!([1, 2, 3])),
            Err(CatalogError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_to_raw_record_maps_fields() {
        let source = json!({
            "name": "sales_monthly",
            "fullyQualifiedName": "mysql.sales_db.public.sales_monthly",
            "description": "Monthly sales rollup",
            "database": { "name": "sales_db", "fullyQualifiedName": "mysql.sales_db" },
            "columns": [
                { "name": "month", "dataType": "DATE" },
                { "name": "total", "dataType": "DECIMAL", "description": "Net total" }
            ]
        });
        let raw = to_raw_record(&source);
        assert_eq!(raw.name.as_deref(), Some("sales_monthly"));
        assert_eq!(raw.container_name.as_deref(), Some("sales_db"));
        assert_eq!(
            raw.qualified_name.as_deref(),
            Some("mysql.sales_db.public.sales_monthly")
        );
        assert_eq!(raw.columns.len(), 2);
        assert_eq!(raw.columns[1].description.as_deref(), Some("Net total"));
    }

    #[test]
    fn test_to_raw_record_tolerates_missing_fields() {
        let raw = to_raw_record(&json!({ "description": 42 }));
        assert!(raw.name.is_none());
        assert!(raw.qualified_name.is_none());
        assert!(raw.description.is_none());
        assert!(raw.columns.is_empty());
    }

    #[test]
    fn test_database_name_string_form() {
        let raw = to_raw_record(&json!({ "name": "t", "database": "legacy_db" }));
        assert_eq!(raw.container_name.as_deref(), Some("legacy_db"));
    }

    #[test]
    fn test_filter_by_database() {
        let hits = vec![
            json!({ "name": "a", "fullyQualifiedName": "mysql.MySQL Test Database.a",
                    "database": { "name": "MySQL Test Database" } }),
            json!({ "name": "b", "fullyQualifiedName": "pg.analytics.b",
                    "database": { "name": "analytics" } }),
        ];
        let filtered = filter_by_database(&hits, "MySQL Test");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0]["name"], "a");

        assert!(filter_by_database(&hits, "oracle").is_empty());
    }

    #[test]
    fn test_build_databases_url() {
        let catalog = OpenMetadataCatalog::new(test_config()).unwrap();
        assert_eq!(
            catalog.build_databases_url(),
            "http://localhost:8585/api/v1/databases?limit=100"
        );
    }

    #[test]
    fn test_database_listing_maps_entities() {
        let body = json!({
            "data": [
                {"name": "ventas", "service": {"name": "postgres_prod", "type": "databaseService"}},
                {"name": "crm"},
                {"service": {"name": "orphan"}},
                {"name": "  "}
            ],
            "paging": {"total": 4}
        });

        let databases: Vec<DatabaseSummary> = data_array(body, "database listing")
            .unwrap()
            .iter()
            .filter_map(to_database_summary)
            .collect();

        assert_eq!(
            databases,
            vec![
                DatabaseSummary::new("ventas").with_service("postgres_prod"),
                DatabaseSummary::new("crm"),
            ]
        );
    }

    #[test]
    fn test_data_array_rejects_unknown_shape() {
        let err = data_array(json!({"items": []}), "database listing").unwrap_err();
        assert!(err.to_string().contains("database listing"));
        assert!(data_array(json!("nope"), "database listing").is_err());
    }
}
