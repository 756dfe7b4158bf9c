//! In-memory stand-ins for the external collaborators.
//!
//! `FakeSupervisor`, `MemoryLogSource` and `StaticKeySource` satisfy the
//! capability traits without touching systemd, the filesystem or `nix`.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{BuildServerError, Result};
use crate::services::cache_key::KeySource;
use crate::services::log_tailer::LogSource;
use crate::services::supervisor::Supervisor;

// ---------------------------------------------------------------------------
// FakeSupervisor
// ---------------------------------------------------------------------------

/// Supervisor over a map of unit name -> active flag.
///
/// A successful `start` marks the unit active, so the unit stays "running"
/// until a test calls [`FakeSupervisor::set_active`] to finish it.
#[derive(Debug)]
pub struct FakeSupervisor {
    units: Mutex<BTreeMap<String, bool>>,
    reachable: AtomicBool,
    start_failure: Mutex<Option<String>>,
    start_calls: AtomicUsize,
}

impl Default for FakeSupervisor {
    fn default() -> Self {
        Self {
            units: Mutex::new(BTreeMap::new()),
            reachable: AtomicBool::new(true),
            start_failure: Mutex::new(None),
            start_calls: AtomicUsize::new(0),
        }
    }
}

impl FakeSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(self, unit: impl Into<String>, active: bool) -> Self {
        self.set_active(&unit.into(), active);
        self
    }

    pub fn set_active(&self, unit: &str, active: bool) {
        self.units.lock().unwrap().insert(unit.to_string(), active);
    }

    /// Make every call fail as if systemd could not be reached.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Make `start` fail with `stderr` as the diagnostic.
    pub fn fail_starts_with(&self, stderr: impl Into<String>) {
        *self.start_failure.lock().unwrap() = Some(stderr.into());
    }

    /// Number of start requests received, successful or not.
    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<()> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BuildServerError::ProbeUnavailable(
                "Failed to connect to bus: No such file or directory".into(),
            ))
        }
    }
}

#[async_trait]
impl Supervisor for FakeSupervisor {
    async fn list_units(&self, pattern: &str) -> Result<Vec<String>> {
        self.check_reachable()?;
        let prefix = pattern.trim_end_matches('*');
        let units = self.units.lock().unwrap();
        Ok(units
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn is_active(&self, unit: &str) -> Result<bool> {
        self.check_reachable()?;
        Ok(self.units.lock().unwrap().get(unit).copied().unwrap_or(false))
    }

    async fn start(&self, unit: &str) -> Result<()> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        if let Some(stderr) = self.start_failure.lock().unwrap().clone() {
            return Err(BuildServerError::CommandFailed {
                command: format!("systemctl start {unit}"),
                code: 1,
                stderr,
            });
        }
        self.set_active(unit, true);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryLogSource
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryLogSource {
    logs: Mutex<HashMap<String, Vec<String>>>,
}

impl MemoryLogSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log<I, S>(self, repository: &str, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.logs.lock().unwrap().insert(
            repository.to_string(),
            lines.into_iter().map(Into::into).collect(),
        );
        self
    }
}

#[async_trait]
impl LogSource for MemoryLogSource {
    async fn read_tail(&self, repository: &str, line_count: usize) -> Result<Vec<String>> {
        let logs = self.logs.lock().unwrap();
        let Some(lines) = logs.get(repository) else {
            return Ok(Vec::new());
        };
        let start = lines.len().saturating_sub(line_count);
        Ok(lines[start..].to_vec())
    }
}

// ---------------------------------------------------------------------------
// StaticKeySource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct StaticKeySource {
    key: Option<String>,
}

impl StaticKeySource {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }

    pub fn unavailable() -> Self {
        Self { key: None }
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn public_key(&self) -> Result<String> {
        self.key.clone().ok_or_else(|| {
            BuildServerError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "cache-key: No such file or directory",
            ))
        })
    }
}
