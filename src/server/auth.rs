//! Bearer-token middleware.

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::state::AppState;

/// Require `Authorization: Bearer <secret>` on every request except the
/// health and metrics probes. A worker without a configured secret accepts
/// everything.
pub(crate) async fn worker_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if matches!(request.uri().path(), "/health" | "/metrics") {
        return next.run(request).await;
    }
    let Some(secret) = &state.worker_secret else {
        return next.run(request).await;
    };

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value == format!("Bearer {secret}"))
        .unwrap_or(false);

    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "Unauthorized"})))
            .into_response();
    }
    next.run(request).await
}
