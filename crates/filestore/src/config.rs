//! Configuration for the file store.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated file store configuration, read from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Directory holding `<uuid>.enc` ciphertext blobs.
    #[serde(default = "default_storage_dir")]
    pub vault_storage_dir: String,
}

fn default_storage_dir() -> String {
    "uploads/encrypted".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            vault_storage_dir: default_storage_dir(),
        }
    }
}

impl StoreConfig {
    /// Load and validate configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_source(config::Environment::default())
    }

    /// Load from an explicit environment source.
    pub fn from_source(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env)
            .build()
            .context("failed to build file store configuration")?;

        let c: StoreConfig = cfg
            .try_deserialize()
            .context("failed to deserialise file store configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.vault_storage_dir.trim().is_empty() {
            anyhow::bail!("VAULT_STORAGE_DIR must not be empty");
        }
        Ok(())
    }
}
