//! The process supervisor that owns the build units.
//!
//! Everything this service knows about live activity comes through this
//! trait; the production implementation is [`super::systemctl::SystemdSupervisor`]
//! and tests use [`super::fakes::FakeSupervisor`].

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait Supervisor: Send + Sync {
    /// Full names of every unit matching the glob `pattern`, in any state.
    async fn list_units(&self, pattern: &str) -> Result<Vec<String>>;

    /// Whether `unit` is currently running.
    async fn is_active(&self, unit: &str) -> Result<bool>;

    /// Request that `unit` be started. Starting a unit that is already
    /// active is a no-op at the supervisor.
    async fn start(&self, unit: &str) -> Result<()>;
}
