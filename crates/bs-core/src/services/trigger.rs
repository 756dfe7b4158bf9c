//! Start a build unless one is already running.
//!
//! The probe and the start are two separate supervisor calls, so two
//! concurrent triggers (or a timer firing in between) can both see the unit
//! idle and both ask for a start. That is accepted: systemd ignores a start
//! for an active unit, so the race ends in one build, not two. Nothing here
//! locks.

use crate::error::{BuildServerError, Result};
use crate::models::{ServerConfig, TriggerOutcome};
use crate::services::probe;
use crate::services::supervisor::Supervisor;

/// Trigger `repository`'s build unit. The caller is responsible for having
/// checked that the repository is known.
pub async fn trigger(
    supervisor: &dyn Supervisor,
    config: &ServerConfig,
    repository: &str,
) -> Result<TriggerOutcome> {
    if probe::is_unit_active(supervisor, config, repository).await {
        tracing::debug!("build for {repository} already in progress");
        return Ok(TriggerOutcome::already_running(repository));
    }

    let unit = config.unit_name(repository);
    match supervisor.start(&unit).await {
        Ok(()) => {
            tracing::info!("Build triggered for {repository}");
            Ok(TriggerOutcome::triggered(repository))
        }
        Err(e) => {
            let diagnostic = e.diagnostic();
            tracing::error!("Failed to trigger build for {repository}: {diagnostic}");
            Err(BuildServerError::TriggerFailed(diagnostic))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TriggerState;
    use crate::services::fakes::FakeSupervisor;

    const ALPHA: &str = "nix-build-alpha.service";

    #[tokio::test]
    async fn idle_unit_is_started() {
        let config = ServerConfig::default();
        let supervisor = FakeSupervisor::new().with_unit(ALPHA, false);

        let outcome = trigger(&supervisor, &config, "alpha").await.unwrap();
        assert_eq!(outcome.status, TriggerState::Triggered);
        assert_eq!(outcome.message, "Build started for alpha");
        assert_eq!(outcome.repository, "alpha");
        assert_eq!(supervisor.start_calls(), 1);
    }

    #[tokio::test]
    async fn running_unit_is_left_alone() {
        let config = ServerConfig::default();
        let supervisor = FakeSupervisor::new().with_unit(ALPHA, true);

        let outcome = trigger(&supervisor, &config, "alpha").await.unwrap();
        assert_eq!(outcome.status, TriggerState::AlreadyRunning);
        assert_eq!(outcome.message, "Build for alpha already in progress");
        assert_eq!(supervisor.start_calls(), 0);
    }

    #[tokio::test]
    async fn repeated_triggers_start_once() {
        let config = ServerConfig::default();
        let supervisor = FakeSupervisor::new().with_unit(ALPHA, false);

        let first = trigger(&supervisor, &config, "alpha").await.unwrap();
        assert_eq!(first.status, TriggerState::Triggered);
        for _ in 0..5 {
            let again = trigger(&supervisor, &config, "alpha").await.unwrap();
            assert_eq!(again.status, TriggerState::AlreadyRunning);
        }
        assert_eq!(supervisor.start_calls(), 1);

        // Build finishes; the next trigger starts a fresh one.
        supervisor.set_active(ALPHA, false);
        let next = trigger(&supervisor, &config, "alpha").await.unwrap();
        assert_eq!(next.status, TriggerState::Triggered);
        assert_eq!(supervisor.start_calls(), 2);
    }

    #[tokio::test]
    async fn supervisor_failure_carries_diagnostic() {
        let config = ServerConfig::default();
        let supervisor = FakeSupervisor::new().with_unit(ALPHA, false);
        supervisor.fail_starts_with("sudo: a password is required");

        let err = trigger(&supervisor, &config, "alpha").await.unwrap_err();
        match err {
            BuildServerError::TriggerFailed(detail) => {
                assert_eq!(detail, "sudo: a password is required")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
