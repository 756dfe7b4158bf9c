use serde::{Deserialize, Serialize};

/// Everything a client needs to point a Nix installation at this host's cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerInfo {
    pub hostname: String,
    pub api_port: u16,
    pub cache_port: u16,
    pub cache_url: String,
    pub public_key: String,
    pub repositories: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildLogs {
    pub logs: Vec<String>,
}
