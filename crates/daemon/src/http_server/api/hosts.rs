use axum::extract::State;
use axum::Json;

use crate::ServiceState;

/// List the hosts the scanner found on the last cycle.
///
/// Reads one immutable snapshot; never observes a scan in progress.
pub async fn handler(State(state): State<ServiceState>) -> Json<Vec<String>> {
    let hosts = state.scanner().current_hosts();
    Json(hosts.iter().map(ToString::to_string).collect())
}
