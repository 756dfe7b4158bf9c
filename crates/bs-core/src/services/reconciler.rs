//! Merge persisted build history with live supervisor state.
//!
//! The status record is authoritative for history, the probe for current
//! activity. A stale "finished" record never hides a running build, and a
//! failed probe never fabricates history.

use crate::models::{BuildResult, BuildStatus, ServerConfig};
use crate::services::probe;
use crate::services::status_store::StatusStore;
use crate::services::supervisor::Supervisor;

/// Overlay the live `is_running` flag onto persisted history.
pub fn reconcile(repository: &str, persisted: Option<BuildResult>, is_running: bool) -> BuildStatus {
    match persisted {
        Some(result) => BuildStatus::from_result(repository.to_string(), result, is_running),
        None => BuildStatus::never_built(repository.to_string(), is_running),
    }
}

/// Read the record and probe the unit independently, then reconcile.
pub async fn get_status(
    supervisor: &dyn Supervisor,
    store: &StatusStore,
    config: &ServerConfig,
    repository: &str,
) -> BuildStatus {
    let (persisted, is_running) = tokio::join!(
        store.read_result(repository),
        probe::is_unit_active(supervisor, config, repository),
    );
    reconcile(repository, persisted, is_running)
}
