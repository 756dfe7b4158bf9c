use std::collections::BTreeSet;

use crate::models::ServerConfig;
use crate::services::supervisor::Supervisor;

/// Repository names of every managed build unit, sorted and deduplicated.
///
/// A supervisor failure yields an empty list, same as a host with no build
/// units; only the log line tells them apart.
pub async fn list_units(supervisor: &dyn Supervisor, config: &ServerConfig) -> Vec<String> {
    let pattern = format!("{}*", config.unit_prefix);
    match supervisor.list_units(&pattern).await {
        Ok(units) => {
            let repositories = repositories_from_units(&units, config);
            if repositories.is_empty() {
                tracing::debug!("no build units match {pattern}");
            }
            repositories
        }
        Err(e) => {
            tracing::warn!("unit discovery failed, supervisor unreachable: {e}");
            Vec::new()
        }
    }
}

/// Strip the naming convention off raw unit names. Units that do not carry
/// both prefix and suffix (timers, sockets, the cache daemon) are dropped.
pub fn repositories_from_units<S: AsRef<str>>(units: &[S], config: &ServerConfig) -> Vec<String> {
    units
        .iter()
        .filter_map(|unit| config.repository_for_unit(unit.as_ref()))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
