use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum BuildServerError {
    #[error("Repository '{0}' not found")]
    NotFound(String),

    #[error("Build trigger failed: {0}")]
    TriggerFailed(String),

    #[error("supervisor query failed: {0}")]
    ProbeUnavailable(String),

    #[error("corrupt status record at {path}: {reason}")]
    PersistedRecordCorrupt { path: PathBuf, reason: String },

    #[error("{command} failed (exit {code}): {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} timed out after {after:?}")]
    Timeout { command: String, after: Duration },

    #[error("config file not found at {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BuildServerError {
    /// The most useful human-readable diagnostic: stderr for failed commands,
    /// the display string otherwise.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::CommandFailed { stderr, .. } if !stderr.is_empty() => stderr.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildServerError>;
