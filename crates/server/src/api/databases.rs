//! Catalog database listing.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use concierge_core::{CatalogError, DatabaseSummary};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DatabasesResponse {
    pub databases: Vec<DatabaseSummary>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct DatabasesErrorResponse {
    pub error: String,
}

fn status_for(error: &CatalogError) -> StatusCode {
    match error {
        CatalogError::Api { .. } | CatalogError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// GET /api/v1/databases
pub async fn list_databases(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DatabasesResponse>, (StatusCode, Json<DatabasesErrorResponse>)> {
    match state.services().catalog().list_databases().await {
        Ok(databases) => {
            info!(count = databases.len(), "Listed catalog databases");
            Ok(Json(DatabasesResponse {
                count: databases.len(),
                databases,
            }))
        }
        Err(e) => {
            warn!(error = %e, "Failed to list catalog databases");
            Err((
                status_for(&e),
                Json(DatabasesErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}
