use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use common::prelude::{AccessError, StoreError};

use crate::ServiceState;

/// Hand the raw encrypted bytes to an authorized requester.
///
/// The response is still ciphertext; the recipient decrypts with the
/// out-of-band pre-shared key.
pub async fn handler(
    State(state): State<ServiceState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path(storage_name): Path<String>,
) -> Result<Response, DownloadError> {
    let requester = peer.ip().to_string();

    let record = state.gate().authorize(&storage_name, &requester)?;
    let bytes = state.store().read_raw(&record.storage_name).await?;

    tracing::info!(
        storage_name = %record.storage_name,
        requester = %requester,
        "sending encrypted file"
    );

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/octet-stream".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", record.storage_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for DownloadError {
    fn into_response(self) -> Response {
        match self {
            DownloadError::Access(AccessError::NotFound(name)) => {
                tracing::warn!(storage_name = %name, "download failed: file not found");
                (
                    http::StatusCode::NOT_FOUND,
                    Json(serde_json::json!({"error": "File not found"})),
                )
                    .into_response()
            }
            DownloadError::Access(AccessError::Forbidden(name)) => {
                tracing::warn!(storage_name = %name, "download failed: access denied");
                (
                    http::StatusCode::FORBIDDEN,
                    Json(serde_json::json!({"error": "Access denied"})),
                )
                    .into_response()
            }
            DownloadError::Store(e) => {
                tracing::error!("download failed reading blob: {}", e);
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": "Unexpected error"})),
                )
                    .into_response()
            }
        }
    }
}
