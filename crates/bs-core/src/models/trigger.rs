use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TriggerState {
    Triggered,
    AlreadyRunning,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriggerOutcome {
    pub status: TriggerState,
    pub message: String,
    pub repository: String,
}

impl TriggerOutcome {
    pub fn triggered(repository: &str) -> Self {
        Self {
            status: TriggerState::Triggered,
            message: format!("Build started for {repository}"),
            repository: repository.to_string(),
        }
    }

    pub fn already_running(repository: &str) -> Self {
        Self {
            status: TriggerState::AlreadyRunning,
            message: format!("Build for {repository} already in progress"),
            repository: repository.to_string(),
        }
    }
}
