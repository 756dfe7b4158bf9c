use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{BuildServerError, Result};
use crate::models::ServerConfig;

pub const ENV_DATA_DIR: &str = "BUILD_SERVER_DATA_DIR";
pub const ENV_HOSTNAME: &str = "BUILD_SERVER_HOSTNAME";
pub const ENV_BIND_ADDRESS: &str = "BUILD_SERVER_BIND_ADDRESS";
pub const ENV_API_PORT: &str = "BUILD_SERVER_API_PORT";
pub const ENV_CACHE_PORT: &str = "BUILD_SERVER_CACHE_PORT";
pub const ENV_CACHE_KEY: &str = "BUILD_SERVER_CACHE_KEY";
pub const ENV_COMMAND_TIMEOUT: &str = "BUILD_SERVER_COMMAND_TIMEOUT";
pub const ENV_ENABLE_WEB_UI: &str = "ENABLE_WEB_UI";

/// Defaults, then the optional YAML file, then the process environment.
pub fn load(config_path: Option<&Path>) -> Result<ServerConfig> {
    load_with_env(config_path, |key| std::env::var(key).ok())
}

/// [`load`] with an injectable environment lookup.
pub fn load_with_env<F>(config_path: Option<&Path>, lookup: F) -> Result<ServerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match config_path {
        Some(path) => load_file(path)?,
        None => ServerConfig::default(),
    };
    apply_env(&mut config, lookup)?;
    validate(&config)?;
    Ok(config)
}

fn load_file(path: &Path) -> Result<ServerConfig> {
    if !path.exists() {
        return Err(BuildServerError::ConfigNotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| BuildServerError::InvalidConfig(e.to_string()))
}

fn apply_env<F>(config: &mut ServerConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(ENV_DATA_DIR) {
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(hostname) = lookup(ENV_HOSTNAME) {
        config.hostname = hostname;
    }
    if let Some(address) = lookup(ENV_BIND_ADDRESS) {
        config.bind_address = address;
    }
    if let Some(port) = lookup(ENV_API_PORT) {
        config.api_port = parse_env(ENV_API_PORT, &port)?;
    }
    if let Some(port) = lookup(ENV_CACHE_PORT) {
        config.cache_port = parse_env(ENV_CACHE_PORT, &port)?;
    }
    if let Some(path) = lookup(ENV_CACHE_KEY) {
        config.cache_key_path = PathBuf::from(path);
    }
    if let Some(secs) = lookup(ENV_COMMAND_TIMEOUT) {
        config.command_timeout_secs = parse_env(ENV_COMMAND_TIMEOUT, &secs)?;
    }
    if let Some(flag) = lookup(ENV_ENABLE_WEB_UI) {
        config.enable_web_ui = flag.trim() == "1";
    }
    Ok(())
}

fn parse_env<T: FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| BuildServerError::InvalidConfig(format!("{key}='{raw}': {e}")))
}

fn validate(config: &ServerConfig) -> Result<()> {
    if config.hostname.trim().is_empty() {
        return Err(BuildServerError::InvalidConfig(
            "hostname must not be empty".into(),
        ));
    }
    if config.unit_prefix.is_empty() {
        return Err(BuildServerError::InvalidConfig(
            "unit_prefix must not be empty".into(),
        ));
    }
    if config.command_timeout_secs == 0 {
        return Err(BuildServerError::InvalidConfig(
            "command_timeout_secs must be greater than zero".into(),
        ));
    }
    Ok(())
}
