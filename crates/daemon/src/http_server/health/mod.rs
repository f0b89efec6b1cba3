use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router {
    Router::new()
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .with_state(state)
}

async fn healthz_handler() -> Response {
    let msg = serde_json::json!({"status": "ok"});
    (StatusCode::OK, Json(msg)).into_response()
}

/// Ready when the storage root is reachable on disk.
async fn readyz_handler(State(state): State<ServiceState>) -> Response {
    match tokio::fs::metadata(state.store().root()).await {
        Ok(meta) if meta.is_dir() => {
            let msg = serde_json::json!({"status": "ok"});
            (StatusCode::OK, Json(msg)).into_response()
        }
        Ok(_) => {
            let msg = serde_json::json!({
                "status": "failure",
                "message": "storage root is not a directory"
            });
            (StatusCode::SERVICE_UNAVAILABLE, Json(msg)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            let msg = serde_json::json!({
                "status": "failure",
                "message": "storage root is not available"
            });
            (StatusCode::SERVICE_UNAVAILABLE, Json(msg)).into_response()
        }
    }
}
