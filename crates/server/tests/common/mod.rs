//! Common test utilities for API testing with mocks.
//!
//! Builds the real router over mock collaborators so requests run
//! in-process without OpenMetadata, an LLM or Jira.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use concierge_core::{
    testing::{MockCatalog, MockDraftGenerator, MockTracker},
    Config, Services,
};
use concierge_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use concierge_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new().await;
///     let response = fixture.post("/api/v1/search", json!({ "query": "monthly sales" })).await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock catalog - configure search results and failures
    pub catalog: Arc<MockCatalog>,
    /// Mock draft generator - raw SQL text returned for unmatched requests
    pub drafter: Arc<MockDraftGenerator>,
    /// Mock tracker - inspect created tickets
    pub tracker: Arc<MockTracker>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let catalog = Arc::new(MockCatalog::new());
        let drafter = Arc::new(MockDraftGenerator::new(&test_config.draft_response));
        let tracker = Arc::new(match &test_config.tracker_failure {
            Some(message) => MockTracker::failing(message),
            None => MockTracker::new(),
        });

        let config = Config::default();
        let tracker_dep: Option<Arc<dyn concierge_core::TicketTracker>> = if test_config.with_tracker
        {
            Some(Arc::clone(&tracker) as Arc<dyn concierge_core::TicketTracker>)
        } else {
            None
        };

        let services = Services::from_parts(
            Arc::clone(&catalog) as Arc<dyn concierge_core::CatalogSearcher>,
            None,
            tracker_dep,
            &config,
        )
        .expect("Failed to build services")
        .with_draft_generator(Arc::clone(&drafter) as Arc<dyn concierge_core::DraftGenerator>);

        let state = Arc::new(AppState::new(config, services));
        let router = create_router(state);

        Self {
            router,
            catalog,
            drafter,
            tracker,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a GET request and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Wire a tracker into the services
    pub with_tracker: bool,
    /// Make the tracker fail every ticket with this message
    pub tracker_failure: Option<String>,
    /// Raw text the draft generator returns
    pub draft_response: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            with_tracker: true,
            tracker_failure: None,
            draft_response: "SELECT 1".to_string(),
        }
    }
}

impl TestConfig {
    /// No tracker configured.
    pub fn without_tracker() -> Self {
        Self {
            with_tracker: false,
            ..Default::default()
        }
    }

    /// A tracker that rejects every ticket.
    pub fn with_failing_tracker(message: &str) -> Self {
        Self {
            tracker_failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    /// Draft generator returning `response`.
    pub fn with_draft(response: &str) -> Self {
        Self {
            draft_response: response.to_string(),
            ..Default::default()
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
