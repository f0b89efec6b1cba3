use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

pub mod download;
pub mod hosts;
pub mod list;
pub mod upload;

use crate::ServiceState;

use common::prelude::FileInfo;

/// One file as presented to clients: stat-enriched storage metadata plus
/// the name the uploader gave it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub original_name: String,
    #[serde(flatten)]
    pub info: FileInfo,
}

pub fn router(state: ServiceState) -> Router {
    Router::new()
        .route("/get_ips", get(hosts::handler))
        .route("/get_files", get(list::handler))
        .route("/upload", post(upload::handler))
        .route("/download/:storage_name", get(download::handler))
        .with_state(state)
}
