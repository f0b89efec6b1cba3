use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Multipart, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use common::prelude::{FileRecord, Recipient, StoreError};

use super::FileEntry;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub file: FileEntry,
}

/// Accept one multipart upload, encrypt it into the store, register it.
///
/// Encrypt-then-register is not atomic: a crash between the two steps
/// leaves an orphaned blob with no registry entry. Accepted for this
/// design; the blob is unreachable without a registry record.
pub async fn handler(
    State(state): State<ServiceState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, UploadError> {
    let mut recipient: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Multipart parsing error: {}", e);
        UploadError::Multipart(e.to_string())
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "recipient" => {
                recipient = Some(field.text().await.map_err(|e| {
                    tracing::error!("Error reading recipient field: {}", e);
                    UploadError::Multipart(e.to_string())
                })?);
            }
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        tracing::error!("Error reading file data for {}: {}", filename, e);
                        UploadError::Multipart(e.to_string())
                    })?
                    .to_vec();
                file = Some((filename, data));
            }
            _ => {
                tracing::warn!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let (filename, data) = file.ok_or_else(|| UploadError::Validation("No file part".into()))?;
    if filename.is_empty() {
        return Err(UploadError::Validation("No selected file".into()));
    }

    let recipient = Recipient::from(recipient.unwrap_or_default().as_str());
    let recipient = match recipient {
        Recipient::Addr(a) if a.is_empty() => Recipient::Everyone,
        other => other,
    };
    let sender = peer.ip().to_string();

    tracing::info!(
        filename = %filename,
        bytes = data.len(),
        sender = %sender,
        recipient = %recipient,
        "accepting upload"
    );

    // Stage the plaintext next to the store, encrypt it in, then let the
    // temp file drop. The store never removes its own input.
    let temp = tempfile::NamedTempFile::new_in(state.store().root())?;
    tokio::fs::write(temp.path(), &data).await?;
    let stored = state
        .store()
        .encrypt_to_store(temp.path(), &filename)
        .await?;
    drop(temp);

    state.registry().register(FileRecord {
        original_name: filename.clone(),
        storage_name: stored.storage_name.clone(),
        sender,
        recipient,
    });

    let info = state.store().file_info(&stored.storage_name).await?;

    Ok((
        http::StatusCode::OK,
        axum::Json(UploadResponse {
            message: "File uploaded and encrypted successfully!".to_string(),
            file: FileEntry {
                original_name: filename,
                info,
            },
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Multipart error: {0}")]
    Multipart(String),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        match self {
            UploadError::Validation(msg) | UploadError::Multipart(msg) => {
                (http::StatusCode::BAD_REQUEST, msg).into_response()
            }
            UploadError::Store(e) => {
                tracing::error!("Upload failed in store: {}", e);
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected error".to_string(),
                )
                    .into_response()
            }
            UploadError::Io(e) => {
                tracing::error!("Upload failed on temp file: {}", e);
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected error".to_string(),
                )
                    .into_response()
            }
        }
    }
}
