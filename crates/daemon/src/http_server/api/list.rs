use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Query, State};
use axum::Json;
use serde::Deserialize;

use super::FileEntry;
use crate::ServiceState;

#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Size,
    Created,
    Modified,
    Accessed,
}

impl SortKey {
    /// Invalid or missing keys fall back to sorting by name.
    fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("size") => SortKey::Size,
            Some("created") => SortKey::Created,
            Some("modified") => SortKey::Modified,
            Some("accessed") => SortKey::Accessed,
            _ => SortKey::Name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Invalid or missing directions fall back to ascending.
    fn from_param(param: Option<&str>) -> Self {
        match param.map(str::to_ascii_lowercase).as_deref() {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

fn apply_sort(files: &mut [FileEntry], key: SortKey, order: SortOrder) {
    match key {
        SortKey::Name => files.sort_by(|a, b| a.info.name.cmp(&b.info.name)),
        SortKey::Size => files.sort_by(|a, b| a.info.size.cmp(&b.info.size)),
        SortKey::Created => files.sort_by(|a, b| a.info.created.total_cmp(&b.info.created)),
        SortKey::Modified => files.sort_by(|a, b| a.info.modified.total_cmp(&b.info.modified)),
        SortKey::Accessed => files.sort_by(|a, b| a.info.accessed.total_cmp(&b.info.accessed)),
    }
    if order == SortOrder::Desc {
        files.reverse();
    }
}

/// List the files visible to the requester, stat-enriched and sorted.
pub async fn handler(
    State(state): State<ServiceState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<FileEntry>> {
    let requester = peer.ip().to_string();
    let records = state.registry().list_visible_to(&requester);

    let mut files = Vec::with_capacity(records.len());
    for record in records {
        match state.store().file_info(&record.storage_name).await {
            Ok(info) => files.push(FileEntry {
                original_name: record.original_name,
                info,
            }),
            // A blob we can't stat is omitted from the listing, not fatal.
            Err(e) => {
                tracing::warn!(
                    storage_name = %record.storage_name,
                    error = %e,
                    "skipping unstattable file in listing"
                );
            }
        }
    }

    let key = SortKey::from_param(query.sort.as_deref());
    let order = SortOrder::from_param(query.order.as_deref());
    apply_sort(&mut files, key, order);

    Json(files)
}
