pub mod build;
pub mod config;
pub mod health;
pub mod info;
pub mod trigger;

pub use build::{BuildOutcome, BuildResult, BuildStatus};
pub use config::ServerConfig;
pub use health::{HealthState, HealthVerdict};
pub use info::{BuildLogs, ServerInfo};
pub use trigger::{TriggerOutcome, TriggerState};
