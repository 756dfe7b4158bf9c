use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Process-wide settings, read once at startup and never mutated.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Root holding `status/<repo>.json` and `logs/<repo>.log`.
    pub data_dir: PathBuf,
    pub hostname: String,
    pub bind_address: String,
    pub api_port: u16,
    pub cache_port: u16,
    pub enable_web_ui: bool,
    pub unit_prefix: String,
    pub unit_suffix: String,
    pub cache_unit: String,
    pub cache_key_path: PathBuf,
    pub command_timeout_secs: u64,
    /// Start units through `sudo -n`; see
    /// [`crate::services::systemctl::start_command`] for the exact argv.
    pub use_sudo: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("/var/lib/nix-build-server"),
            hostname: "build-server".to_string(),
            bind_address: "0.0.0.0".to_string(),
            api_port: 8000,
            cache_port: 5000,
            enable_web_ui: true,
            unit_prefix: "nix-build-".to_string(),
            unit_suffix: ".service".to_string(),
            cache_unit: "harmonia".to_string(),
            cache_key_path: PathBuf::from("/var/lib/harmonia/cache-key"),
            command_timeout_secs: 10,
            use_sudo: true,
        }
    }
}

impl ServerConfig {
    pub fn cache_url(&self) -> String {
        format!("http://{}:{}", self.hostname, self.cache_port)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Supervisor unit name for a repository.
    pub fn unit_name(&self, repository: &str) -> String {
        format!("{}{repository}{}", self.unit_prefix, self.unit_suffix)
    }

    /// Inverse of [`Self::unit_name`]; `None` for units outside the convention.
    pub fn repository_for_unit<'a>(&self, unit: &'a str) -> Option<&'a str> {
        unit.strip_prefix(self.unit_prefix.as_str())?
            .strip_suffix(self.unit_suffix.as_str())
            .filter(|name| !name.is_empty())
    }
}
