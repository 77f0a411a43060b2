use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use tracing::{info, warn};

use forgefeed_events::{StoreError, DEFAULT_RECENT_LIMIT};

use crate::feed::render_feed;
use crate::normalize::{normalize, Normalized};
use crate::AppState;

/// Maps a store failure to its response: 503 when the database cannot be
/// reached, 500 when it answered but the operation failed.
fn store_failure(e: StoreError, context: &str) -> Response {
    warn!(error = %e, "{context}");
    let status = match e {
        StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        StoreError::Operation(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(serde_json::json!({
            "status": "error",
            "message": e.to_string(),
        })),
    )
        .into_response()
}

pub async fn api_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let event_type = headers
        .get("x-github-event")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    // The receipt instant is the event timestamp; nothing in the payload
    // overrides it.
    let received_at = Utc::now();

    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "status": "rejected",
                    "error": format!("invalid JSON body: {e}"),
                })),
            )
                .into_response();
        }
    };

    match normalize(event_type, &payload, received_at) {
        Ok(Normalized::Event(event)) => {
            let action = event.action;
            match state.store.append(event).await {
                Ok(id) => {
                    info!(id, action = %action, "stored webhook event");
                    Json(serde_json::json!({
                        "status": "success",
                        "id": id.to_string(),
                    }))
                    .into_response()
                }
                Err(e) => store_failure(e, "failed to append webhook event"),
            }
        }
        Ok(Normalized::Ignored) => {
            info!(event_type, "ignoring webhook delivery");
            Json(serde_json::json!({"status": "ignored"})).into_response()
        }
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "status": "rejected",
                "error": e.to_string(),
            })),
        )
            .into_response(),
    }
}

pub async fn api_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.recent(DEFAULT_RECENT_LIMIT).await {
        Ok(events) => Json(render_feed(&events)).into_response(),
        Err(e) => store_failure(e, "failed to load recent events"),
    }
}

pub async fn api_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let count = match state.store.count().await {
        Ok(count) => count,
        Err(e) => {
            warn!(error = %e, "health check cannot reach event store");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "connected": false,
                    "count": 0,
                    "sample": null,
                })),
            )
                .into_response();
        }
    };

    let sample = state.store.sample().await.unwrap_or_else(|e| {
        warn!(error = %e, "health check failed to load sample event");
        None
    });

    Json(serde_json::json!({
        "connected": true,
        "count": count,
        "sample": sample,
    }))
    .into_response()
}
