//! In-process API tests over mock collaborators.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use concierge_core::DatabaseSummary;

use common::{fixtures, TestConfig, TestFixture};

#[tokio::test]
async fn test_health_reports_services() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/health").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["services"]["api"], "ok");
    assert_eq!(response.body["services"]["catalog"], "ok");
    assert_eq!(response.body["services"]["tracker"], "ok");
    assert_eq!(response.body["services"]["llm"], "not_configured");
}

#[tokio::test]
async fn test_health_degraded_when_catalog_down() {
    let fixture = TestFixture::new().await;
    fixture.catalog.set_unhealthy(true).await;

    let response = fixture.get("/api/v1/health").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "degraded");
    assert_eq!(response.body["services"]["catalog"], "unavailable");
}

#[tokio::test]
async fn test_list_databases() {
    let fixture = TestFixture::new().await;
    fixture
        .catalog
        .set_databases(vec![
            DatabaseSummary::new("ventas").with_service("postgres_prod"),
            DatabaseSummary::new("crm"),
        ])
        .await;

    let response = fixture.get("/api/v1/databases").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["count"], 2);
    assert_eq!(response.body["databases"][0]["name"], "ventas");
    assert_eq!(response.body["databases"][0]["service"], "postgres_prod");
    assert!(response.body["databases"][1]["service"].is_null());
}

#[tokio::test]
async fn test_list_databases_empty_catalog() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/databases").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["count"], 0);
    assert_eq!(response.body["databases"], json!([]));
}

#[tokio::test]
async fn test_list_databases_catalog_down_is_unavailable() {
    let fixture = TestFixture::new().await;
    fixture.catalog.set_unhealthy(true).await;

    let response = fixture.get("/api/v1/databases").await;

    assert_status!(response, StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("mock catalog down"));
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/config").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["server"]["port"], 8080);
    assert_eq!(response.body["matcher"]["strategy"], "name");
    assert!(response.body.get("tracker").is_none());
}

#[tokio::test]
async fn test_search_exact_match() {
    let fixture = TestFixture::new().await;
    fixture
        .catalog
        .set_results(vec![
            fixtures::raw_asset("sales_monthly", "analytics", "dw.analytics.sales_monthly"),
            fixtures::raw_asset("customers", "crm", "dw.crm.customers"),
        ])
        .await;

    let response = fixture
        .post("/api/v1/search", json!({ "query": "monthly sales" }))
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["state"], "resolved");
    assert_eq!(response.body["outcome"]["kind"], "matched");
    assert_eq!(response.body["outcome"]["asset"]["name"], "sales_monthly");
    assert_eq!(response.body["ticket_created"], false);
    assert_eq!(fixture.drafter.call_count().await, 0);
}

#[tokio::test]
async fn test_search_unmatched_without_escalation() {
    let fixture = TestFixture::with_config(TestConfig::with_draft("```sql\nSELECT 1\n```")).await;
    fixture
        .catalog
        .set_results(vec![
            fixtures::raw_asset("inventory", "ops", "dw.ops.inventory"),
            fixtures::raw_asset("suppliers", "ops", "dw.ops.suppliers"),
        ])
        .await;

    let response = fixture
        .post("/api/v1/search", json!({ "query": "customer churn analysis" }))
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    // The unset flag is the caller's answer to the escalation question.
    assert_eq!(response.body["user_declined"], true);
    assert_eq!(response.body["state"], "resolved");
    assert_eq!(response.body["ticket_created"], false);
    assert_eq!(response.body["outcome"]["kind"], "unmatched");
    assert_eq!(response.body["outcome"]["draft"], "SELECT 1");
    assert_eq!(
        response.body["outcome"]["related"].as_array().unwrap().len(),
        2
    );
    assert_eq!(fixture.tracker.attempt_count().await, 0);
}

#[tokio::test]
async fn test_search_escalates_when_requested() {
    let fixture = TestFixture::new().await;
    fixture
        .catalog
        .set_results(vec![fixtures::raw_asset("inventory", "ops", "dw.ops.inventory")])
        .await;

    let response = fixture
        .post(
            "/api/v1/search",
            json!({
                "query": "customer churn analysis",
                "user_id": "ana",
                "create_ticket_if_not_found": true
            }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["ticket_created"], true);
    assert_eq!(response.body["ticket_id"], "MOCK-1");

    let tickets = fixture.tracker.received().await;
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].request, "customer churn analysis");
    assert_eq!(tickets[0].draft.as_deref(), Some("SELECT 1"));
}

#[tokio::test]
async fn test_search_empty_query_is_bad_request() {
    let fixture = TestFixture::new().await;

    let response = fixture.post("/api/v1/search", json!({ "query": "   " })).await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["error"]["kind"], "invalid_request");
    assert_eq!(fixture.catalog.search_count().await, 0);
}

#[tokio::test]
async fn test_search_catalog_down_is_unavailable() {
    let fixture = TestFixture::new().await;
    fixture
        .catalog
        .set_next_error(concierge_core::CatalogError::Timeout)
        .await;

    let response = fixture
        .post("/api/v1/search", json!({ "query": "monthly sales" }))
        .await;

    assert_status!(response, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["state"], "failed");
    assert_eq!(response.body["error"]["kind"], "catalog_unavailable");
}

#[tokio::test]
async fn test_search_ticket_failure_is_bad_gateway() {
    let fixture = TestFixture::with_config(TestConfig::with_failing_tracker("jira down")).await;
    fixture
        .catalog
        .set_results(vec![fixtures::raw_asset("inventory", "ops", "dw.ops.inventory")])
        .await;

    let response = fixture
        .post(
            "/api/v1/search",
            json!({ "query": "customer churn", "create_ticket_if_not_found": true }),
        )
        .await;

    assert_status!(response, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["error"]["kind"], "ticket_creation_failed");
    assert_eq!(response.body["outcome"]["kind"], "unmatched");
}

#[tokio::test]
async fn test_search_missing_query_is_rejected() {
    let fixture = TestFixture::new().await;

    let response = fixture.post("/api/v1/search", json!({ "user_id": "ana" })).await;

    assert!(response.status.is_client_error());
}

#[tokio::test]
async fn test_create_ticket_directly() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/tickets",
            json!({
                "user_request": "weekly refunds by store",
                "related_assets": [{
                    "name": "refunds",
                    "container_name": "sales",
                    "qualified_name": "dw.sales.refunds",
                    "description": "",
                    "columns": []
                }],
                "proposed_query": "```sql\nSELECT * FROM dw.sales.refunds\n```"
            }),
        )
        .await;

    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["id"], "MOCK-1");
    assert_eq!(response.body["url"], "https://tracker.test/browse/MOCK-1");

    let tickets = fixture.tracker.received().await;
    assert_eq!(tickets[0].related.len(), 1);
    assert_eq!(
        tickets[0].draft.as_deref(),
        Some("SELECT * FROM dw.sales.refunds")
    );
}

#[tokio::test]
async fn test_create_ticket_empty_request() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post("/api/v1/tickets", json!({ "user_request": "" }))
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(fixture.tracker.attempt_count().await, 0);
}

#[tokio::test]
async fn test_create_ticket_without_tracker() {
    let fixture = TestFixture::with_config(TestConfig::without_tracker()).await;

    let response = fixture
        .post("/api/v1/tickets", json!({ "user_request": "refunds" }))
        .await;

    assert_status!(response, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_create_ticket_tracker_error() {
    let fixture = TestFixture::with_config(TestConfig::with_failing_tracker("quota")).await;

    let response = fixture
        .post("/api/v1/tickets", json!({ "user_request": "refunds" }))
        .await;

    assert_status!(response, StatusCode::BAD_GATEWAY);
    assert!(response.body["error"].as_str().unwrap().contains("quota"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/v1/health").await;

    let (status, body) = fixture.get_text("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("concierge_http_requests_total"));
}
