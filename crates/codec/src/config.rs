//! Configuration loading and validation for the vault codec.
//!
//! All values are read from environment variables at startup. The process
//! should exit with a clear error message if any variable is invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Deployment mode. Only development may run on the built-in fallback secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    Production,
    Development,
}

/// Validated codec configuration.
#[derive(Clone, Deserialize)]
pub struct CodecConfig {
    /// Master secret as configured. Normalized to 32 bytes when the codec is
    /// built. **Required in production.**
    #[serde(default)]
    pub encryption_master_key: Option<String>,

    /// Deployment mode.
    #[serde(default = "default_vault_mode")]
    pub vault_mode: RuntimeMode,

    /// Maximum number of seal/open jobs running on blocking threads at once.
    /// Defaults to the available parallelism.
    #[serde(default)]
    pub codec_workers: Option<usize>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_vault_mode() -> RuntimeMode {
    RuntimeMode::Production
}
fn default_log_level() -> String {
    "info".into()
}

impl std::fmt::Debug for CodecConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecConfig")
            .field(
                "encryption_master_key",
                &self.encryption_master_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("vault_mode", &self.vault_mode)
            .field("codec_workers", &self.codec_workers)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            encryption_master_key: None,
            vault_mode: default_vault_mode(),
            codec_workers: None,
            log_level: default_log_level(),
        }
    }
}

impl CodecConfig {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        Self::from_source(config::Environment::default())
    }

    /// Load from an explicit environment source (tests inject a map here).
    pub fn from_source(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env)
            .build()
            .context("failed to build configuration from environment")?;

        let c: CodecConfig = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Number of blocking workers to allow, resolving the default.
    pub fn worker_count(&self) -> usize {
        self.codec_workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    fn validate(&self) -> Result<()> {
        if self.codec_workers == Some(0) {
            anyhow::bail!("CODEC_WORKERS must be > 0");
        }
        if let Some(key) = &self.encryption_master_key {
            if key.trim().is_empty() {
                anyhow::bail!("ENCRYPTION_MASTER_KEY must not be empty when set");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::default().source(Some(map))
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_vault_mode(), RuntimeMode::Production);
        assert_eq!(default_log_level(), "info");
        let cfg = CodecConfig::default();
        assert!(cfg.encryption_master_key.is_none());
        assert!(cfg.worker_count() >= 1);
    }

    #[test]
    fn loads_from_environment() {
        let cfg = CodecConfig::from_source(env(&[
            ("ENCRYPTION_MASTER_KEY", "0123456789abcdef0123456789abcdef"),
            ("VAULT_MODE", "development"),
            ("CODEC_WORKERS", "3"),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();
        assert_eq!(
            cfg.encryption_master_key.as_deref(),
            Some("0123456789abcdef0123456789abcdef")
        );
        assert_eq!(cfg.vault_mode, RuntimeMode::Development);
        assert_eq!(cfg.worker_count(), 3);
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn missing_variables_use_defaults() {
        let cfg = CodecConfig::from_source(env(&[])).unwrap();
        assert_eq!(cfg.vault_mode, RuntimeMode::Production);
        assert!(cfg.encryption_master_key.is_none());
    }

    #[test]
    fn rejects_zero_workers() {
        let cfg = CodecConfig {
            codec_workers: Some(0),
            ..CodecConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_blank_secret() {
        let cfg = CodecConfig {
            encryption_master_key: Some("   ".into()),
            ..CodecConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn debug_redacts_secret() {
        let cfg = CodecConfig {
            encryption_master_key: Some("super-secret-value".into()),
            ..CodecConfig::default()
        };
        let shown = format!("{cfg:?}");
        assert!(!shown.contains("super-secret-value"));
        assert!(shown.contains("REDACTED"));
    }
}
