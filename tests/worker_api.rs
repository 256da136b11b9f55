//! Router-level tests driven with an in-process service and a mock session
//! provider; no browser is launched anywhere here.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use flowrunner_core_types::ExecutionId;
use flowrunner_worker::{build_router, AppState, WorkerConfig};
use http_body_util::BodyExt;
use page_driver::{DriverError, PageDriver, PageInfo, PoolError, PoolStatus, SessionProvider};
use serde_json::{json, Value};
use tower::ServiceExt;

struct StubSession;

#[async_trait]
impl PageDriver for StubSession {
    async fn goto(&self, url: &str) -> Result<PageInfo, DriverError> {
        Ok(PageInfo {
            url: url.to_string(),
            title: "Stub".to_string(),
        })
    }

    async fn click(&self, _selector: &str) -> Result<(), DriverError> {
        Ok(())
    }

    async fn fill(
        &self,
        _selector: &str,
        _value: &str,
        _clear_first: bool,
    ) -> Result<(), DriverError> {
        Ok(())
    }

    async fn extract_first(
        &self,
        _selector: &str,
        _attribute: &str,
    ) -> Result<String, DriverError> {
        Ok("stub".to_string())
    }

    async fn extract_all(
        &self,
        _selector: &str,
        _attribute: &str,
    ) -> Result<Vec<String>, DriverError> {
        Ok(vec![])
    }

    async fn wait_for_selector(
        &self,
        _selector: &str,
        _timeout: Duration,
    ) -> Result<(), DriverError> {
        Ok(())
    }

    async fn wait_for_navigation(&self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn screenshot(&self, _full_page: bool) -> Result<Vec<u8>, DriverError> {
        Ok(vec![0])
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok("https://stub.test".to_string())
    }
}

struct StubProvider {
    active: AtomicUsize,
    released: Mutex<Vec<ExecutionId>>,
}

impl StubProvider {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            active: AtomicUsize::new(0),
            released: Mutex::new(Vec::new()),
        })
    }

    fn released(&self) -> Vec<ExecutionId> {
        self.released.lock().expect("released lock").clone()
    }
}

#[async_trait]
impl SessionProvider for StubProvider {
    async fn acquire(
        &self,
        _execution_id: &ExecutionId,
    ) -> Result<Arc<dyn PageDriver>, PoolError> {
        self.active.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StubSession))
    }

    async fn release(&self, execution_id: &ExecutionId) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.released
            .lock()
            .expect("released lock")
            .push(execution_id.clone());
    }

    async fn status(&self) -> PoolStatus {
        PoolStatus {
            active_sessions: self.active.load(Ordering::SeqCst),
            max_sessions: 3,
            browser_connected: false,
        }
    }
}

fn secured_state(provider: Arc<StubProvider>) -> AppState {
    let config = WorkerConfig {
        worker_secret: Some("s3cret".to_string()),
        ..WorkerConfig::default()
    };
    AppState::new(&config, provider)
}

fn post_json(uri: &str, authorized: bool, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if authorized {
        builder = builder.header(header::AUTHORIZATION, "Bearer s3cret");
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn health_needs_no_token_and_reports_the_pool() {
    let app = build_router(secured_state(StubProvider::new()));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["pool"]["maxSessions"], 3);
    assert_eq!(body["pool"]["activeSessions"], 0);
}

#[tokio::test]
async fn requests_without_the_bearer_secret_are_rejected() {
    let app = build_router(secured_state(StubProvider::new()));
    let response = app
        .oneshot(post_json(
            "/execute",
            false,
            json!({"executionId": "e1", "steps": [{"id": "s1", "actionType": "setVariable", "config": {"name": "x", "value": 1}}]}),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn execute_requires_execution_id_and_steps() {
    let app = build_router(secured_state(StubProvider::new()));
    let response = app
        .clone()
        .oneshot(post_json("/execute", true, json!({"steps": []})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json("/execute", true, json!({"executionId": "e1"})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn execute_rejects_unknown_action_tags_up_front() {
    let app = build_router(secured_state(StubProvider::new()));
    let response = app
        .oneshot(post_json(
            "/execute",
            true,
            json!({
                "executionId": "e1",
                "steps": [{"id": "s1", "actionType": "teleport", "config": {}}],
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("teleport"));
}

#[tokio::test]
async fn execute_starts_the_run_and_releases_the_session() {
    let provider = StubProvider::new();
    let app = build_router(secured_state(Arc::clone(&provider)));

    let response = app
        .oneshot(post_json(
            "/execute",
            true,
            json!({
                "executionId": "run-1",
                "steps": [
                    {"id": "s1", "actionType": "setVariable", "config": {"name": "x", "value": "42"}},
                    {"id": "s2", "actionType": "navigate", "config": {"url": "https://a.test/{{x}}"}},
                ],
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "started");
    assert_eq!(body["executionId"], "run-1");

    // The run happens in the background; give it a beat to finish.
    for _ in 0..50 {
        if !provider.released().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(provider.released(), [ExecutionId::from("run-1")]);
}

#[tokio::test]
async fn execute_accepts_a_raw_graph_and_normalizes_it() {
    let provider = StubProvider::new();
    let app = build_router(secured_state(Arc::clone(&provider)));

    // b depends on a; list order is reversed to prove edges drive ordering.
    let response = app
        .oneshot(post_json(
            "/execute",
            true,
            json!({
                "executionId": "run-graph",
                "flow": {
                    "nodes": [
                        {"id": "b", "type": "click", "data": {"config": {"selector": "#go"}}},
                        {"id": "a", "type": "navigate", "data": {"config": {"url": "https://a.test"}}},
                    ],
                    "edges": [{"source": "a", "target": "b"}],
                },
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    for _ in 0..50 {
        if !provider.released().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(provider.released(), [ExecutionId::from("run-graph")]);
}

#[tokio::test]
async fn cancel_flags_the_registry_without_waiting() {
    let state = secured_state(StubProvider::new());
    let cancels = Arc::clone(&state.cancels);
    let app = build_router(state);

    let response = app
        .oneshot(post_json("/cancel/run-9", true, json!({})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert!(cancels.is_cancelled(&ExecutionId::from("run-9")));
}

#[tokio::test]
async fn metrics_endpoint_is_open_and_textual() {
    let app = build_router(secured_state(StubProvider::new()));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}
