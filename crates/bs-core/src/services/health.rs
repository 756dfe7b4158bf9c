use crate::models::{HealthState, HealthVerdict, ServerConfig};
use crate::services::supervisor::Supervisor;
use crate::services::{discovery, probe};

/// Only cache liveness affects the verdict; unit-level failures do not
/// demote it, and nothing maps to [`HealthState::Down`].
pub fn aggregate(cache_running: bool, repositories: Vec<String>) -> HealthVerdict {
    let status = if cache_running {
        HealthState::Healthy
    } else {
        HealthState::Degraded
    };
    HealthVerdict {
        status,
        cache_running,
        repositories,
    }
}

pub async fn health(supervisor: &dyn Supervisor, config: &ServerConfig) -> HealthVerdict {
    let (cache_running, repositories) = tokio::join!(
        probe::is_cache_active(supervisor, config),
        discovery::list_units(supervisor, config),
    );
    aggregate(cache_running, repositories)
}
