//! Routes: execute, cancel, health, metrics.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, Method, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use flow_engine::StepCallback;
use flow_graph::{normalize, FlowGraph};
use flowrunner_core_types::{CallbackEvent, ExecutionId, ExecutionResult, FlowStep, StepResult};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use super::auth::worker_auth;
use super::state::AppState;
use crate::metrics;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/execute", post(execute_handler))
        .route("/cancel/:execution_id", post(cancel_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn_with_state(state.clone(), worker_auth))
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteRequest {
    #[serde(default)]
    execution_id: Option<String>,

    /// Pre-normalized step tree. Takes precedence over `flow`.
    #[serde(default)]
    steps: Vec<FlowStep>,

    /// Raw node/edge graph, normalized server-side.
    #[serde(default)]
    flow: Option<FlowGraph>,

    #[serde(default)]
    callback_url: Option<String>,
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response()
}

/// Start a run. Replies immediately; outcomes travel over the callback URL.
async fn execute_handler(
    State(state): State<AppState>,
    Json(request): Json<ExecuteRequest>,
) -> Response {
    let Some(execution_id) = request.execution_id.filter(|id| !id.is_empty()) else {
        return bad_request("executionId and steps are required");
    };
    let steps = if !request.steps.is_empty() {
        request.steps
    } else if let Some(flow) = &request.flow {
        normalize(flow)
    } else {
        Vec::new()
    };
    if steps.is_empty() {
        return bad_request("executionId and steps are required");
    }
    // Unknown tags are refused up front; the engine would only discover
    // them step by step at run time.
    if let Err(err) = state.registry.validate(&steps) {
        return bad_request(&err.to_string());
    }

    let execution_id = ExecutionId::from(execution_id);
    info!(execution = %execution_id, steps = steps.len(), "execution accepted");
    let reply = json!({"status": "started", "executionId": execution_id.as_str()});

    tokio::spawn(run_flow(state, execution_id, steps, request.callback_url));

    Json(reply).into_response()
}

/// The background run: drive the engine, then deliver the terminal event.
async fn run_flow(
    state: AppState,
    execution_id: ExecutionId,
    steps: Vec<FlowStep>,
    callback_url: Option<String>,
) {
    let on_step: StepCallback = {
        let callbacks = state.callbacks.clone();
        let url = callback_url.clone();
        let id = execution_id.clone();
        Arc::new(move |step: &StepResult| {
            metrics::record_step(step.status);
            if let Some(url) = &url {
                callbacks.dispatch(url, CallbackEvent::step_complete(id.clone(), step.clone()));
            }
        })
    };

    let result = match state.engine.execute(execution_id.clone(), &steps, Some(on_step)).await {
        Ok(result) => result,
        Err(err) => {
            // Infrastructure failure after cleanup; report it like any
            // terminal failure.
            error!(execution = %execution_id, %err, "execution aborted");
            ExecutionResult::failed(execution_id, Vec::new(), err.to_string())
        }
    };

    metrics::record_execution(result.status);
    metrics::set_active_sessions(state.provider.status().await.active_sessions);
    if let Some(url) = &callback_url {
        state
            .callbacks
            .dispatch(url, CallbackEvent::execution_complete(result));
    }
}

/// Flag an execution for cooperative cancellation. No synchronous effect is
/// acknowledged; the run observes the flag at its next step boundary.
async fn cancel_handler(
    State(state): State<AppState>,
    Path(execution_id): Path<String>,
) -> Response {
    if execution_id.is_empty() {
        return bad_request("executionId is required");
    }
    state.cancels.request(ExecutionId::from(execution_id.as_str()));
    metrics::record_cancel_request();
    Json(json!({"status": "ok", "executionId": execution_id})).into_response()
}

async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let pool = state.provider.status().await;
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "pool": pool,
    }))
}

async fn metrics_handler() -> Response {
    metrics::register_metrics();
    match metrics::encode() {
        Ok(body) => ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response(),
        Err(err) => {
            error!(?err, "failed to encode prometheus metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "metric encode error").into_response()
        }
    }
}
