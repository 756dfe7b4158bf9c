use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{BuildServerError, Result};
use crate::models::BuildResult;

/// Read side of the per-repository status records the build jobs write.
pub struct StatusStore {
    status_directory: PathBuf,
}

impl StatusStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            status_directory: data_dir.join("status"),
        }
    }

    pub fn path_for(&self, repository: &str) -> PathBuf {
        self.status_directory.join(format!("{repository}.json"))
    }

    /// Load the record, distinguishing "never built" (`Ok(None)`) from a
    /// record that exists but cannot be used.
    pub async fn load(&self, repository: &str) -> Result<Option<BuildResult>> {
        if !is_safe_file_stem(repository) {
            return Ok(None);
        }
        let path = self.path_for(repository);
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(BuildServerError::PersistedRecordCorrupt {
                    path,
                    reason: e.to_string(),
                })
            }
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| BuildServerError::PersistedRecordCorrupt {
                path,
                reason: e.to_string(),
            })
    }

    /// Load the record, treating anything unusable as absent.
    pub async fn read_result(&self, repository: &str) -> Option<BuildResult> {
        match self.load(repository).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Error reading status for {repository}: {e}");
                None
            }
        }
    }
}

/// Repository names become file names; refuse anything that could escape
/// the status directory.
fn is_safe_file_stem(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains(['/', '\\', '\0'])
}
