//! Point-in-time activity checks. Any supervisor failure reads as "not
//! running": under-reporting activity is preferred to inventing it.

use crate::models::ServerConfig;
use crate::services::supervisor::Supervisor;

pub async fn is_unit_active(
    supervisor: &dyn Supervisor,
    config: &ServerConfig,
    repository: &str,
) -> bool {
    probe(supervisor, &config.unit_name(repository)).await
}

pub async fn is_cache_active(supervisor: &dyn Supervisor, config: &ServerConfig) -> bool {
    probe(supervisor, &config.cache_unit).await
}

async fn probe(supervisor: &dyn Supervisor, unit: &str) -> bool {
    match supervisor.is_active(unit).await {
        Ok(active) => {
            tracing::debug!(unit, active, "probed unit");
            active
        }
        Err(e) => {
            tracing::warn!(unit, "probe unavailable, reporting inactive: {e}");
            false
        }
    }
}
