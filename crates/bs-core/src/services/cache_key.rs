use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ServerConfig;
use crate::services::process;

/// Reported in place of the key when it cannot be derived.
pub const KEY_UNAVAILABLE: &str = "ERROR";

/// Source of the binary cache's public signing key.
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn public_key(&self) -> Result<String>;
}

/// Derives the public key from the cache daemon's secret key file with
/// `nix key convert-secret-to-public`.
pub struct NixKeySource {
    secret_key_path: PathBuf,
    timeout: Duration,
}

impl NixKeySource {
    pub fn new(secret_key_path: PathBuf, timeout: Duration) -> Self {
        Self {
            secret_key_path,
            timeout,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.cache_key_path.clone(), config.command_timeout())
    }
}

#[async_trait]
impl KeySource for NixKeySource {
    async fn public_key(&self) -> Result<String> {
        let secret = tokio::fs::File::open(&self.secret_key_path)
            .await?
            .into_std()
            .await;
        process::run_checked(
            "nix",
            &["key", "convert-secret-to-public"],
            Some(Stdio::from(secret)),
            self.timeout,
        )
        .await
    }
}

/// The public key, or [`KEY_UNAVAILABLE`] if it cannot be read.
pub async fn public_key_or_placeholder(source: &dyn KeySource) -> String {
    match source.public_key().await {
        Ok(key) if !key.is_empty() => key,
        Ok(_) => {
            tracing::warn!("public key derivation produced no output");
            KEY_UNAVAILABLE.to_string()
        }
        Err(e) => {
            tracing::error!("Failed to get public key: {e}");
            KEY_UNAVAILABLE.to_string()
        }
    }
}
