use std::sync::Arc;

use futures::future::join_all;

use crate::error::{BuildServerError, Result};
use crate::models::{BuildStatus, HealthVerdict, ServerConfig, ServerInfo, TriggerOutcome};
use crate::services::cache_key::{self, KeySource, NixKeySource};
use crate::services::log_tailer::{self, FileLogSource, LogSource};
use crate::services::status_store::StatusStore;
use crate::services::supervisor::Supervisor;
use crate::services::systemctl::SystemdSupervisor;
use crate::services::{discovery, health, reconciler, trigger};

/// Facade over the build units on this host.
///
/// Holds no mutable state: every call re-discovers units and re-probes the
/// supervisor, so answers are always current.
pub struct BuildServer {
    config: Arc<ServerConfig>,
    supervisor: Arc<dyn Supervisor>,
    status_store: StatusStore,
    log_source: Arc<dyn LogSource>,
    key_source: Arc<dyn KeySource>,
}

impl BuildServer {
    pub fn new(
        config: Arc<ServerConfig>,
        supervisor: Arc<dyn Supervisor>,
        log_source: Arc<dyn LogSource>,
        key_source: Arc<dyn KeySource>,
    ) -> Self {
        let status_store = StatusStore::new(&config.data_dir);
        Self {
            config,
            supervisor,
            status_store,
            log_source,
            key_source,
        }
    }

    /// Wire up systemd, the on-disk logs and `nix` key conversion.
    pub fn from_config(config: Arc<ServerConfig>) -> Self {
        let supervisor = Arc::new(SystemdSupervisor::from_config(&config));
        let log_source = Arc::new(FileLogSource::new(&config.data_dir));
        let key_source = Arc::new(NixKeySource::from_config(&config));
        Self::new(config, supervisor, log_source, key_source)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Managed repositories, sorted.
    pub async fn list_units(&self) -> Vec<String> {
        discovery::list_units(self.supervisor.as_ref(), &self.config).await
    }

    async fn ensure_known(&self, repository: &str) -> Result<()> {
        if self.list_units().await.iter().any(|r| r == repository) {
            Ok(())
        } else {
            Err(BuildServerError::NotFound(repository.to_string()))
        }
    }

    pub async fn get_status(&self, repository: &str) -> Result<BuildStatus> {
        self.ensure_known(repository).await?;
        Ok(self.status_of(repository).await)
    }

    async fn status_of(&self, repository: &str) -> BuildStatus {
        reconciler::get_status(
            self.supervisor.as_ref(),
            &self.status_store,
            &self.config,
            repository,
        )
        .await
    }

    /// Status of every discovered repository, in discovery order. Units are
    /// probed concurrently, so a hung probe costs one timeout, not one per unit.
    pub async fn statuses(&self) -> Vec<BuildStatus> {
        let repositories = self.list_units().await;
        join_all(repositories.iter().map(|repository| self.status_of(repository))).await
    }

    pub async fn trigger(&self, repository: &str) -> Result<TriggerOutcome> {
        self.ensure_known(repository).await?;
        trigger::trigger(self.supervisor.as_ref(), &self.config, repository).await
    }

    pub async fn health(&self) -> HealthVerdict {
        health::health(self.supervisor.as_ref(), &self.config).await
    }

    /// Up to `requested` trailing log lines, clamped to
    /// [`log_tailer::MAX_TAIL_LINES`]. Unreadable logs come back empty.
    pub async fn tail_log(&self, repository: &str, requested: i64) -> Result<Vec<String>> {
        self.ensure_known(repository).await?;
        let line_count = log_tailer::clamp_line_count(requested);
        match self.log_source.read_tail(repository, line_count).await {
            Ok(lines) => Ok(lines),
            Err(e) => {
                tracing::warn!("failed to read log for {repository}: {e}");
                Ok(Vec::new())
            }
        }
    }

    pub async fn public_key(&self) -> String {
        cache_key::public_key_or_placeholder(self.key_source.as_ref()).await
    }

    pub async fn info(&self) -> ServerInfo {
        let (public_key, repositories) = tokio::join!(self.public_key(), self.list_units());
        ServerInfo {
            hostname: self.config.hostname.clone(),
            api_port: self.config.api_port,
            cache_port: self.config.cache_port,
            cache_url: self.config.cache_url(),
            public_key,
            repositories,
        }
    }
}
