use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
    /// Part of the reported vocabulary; no current condition produces it.
    Down,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthVerdict {
    pub status: HealthState,
    pub cache_running: bool,
    pub repositories: Vec<String>,
}
