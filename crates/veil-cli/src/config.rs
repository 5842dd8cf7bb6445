//! Configuration file management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use anyhow::Context;
use veil_oprf::{LengthPadding, Suite, DEFAULT_CONTEXT, MAX_MIN_BUCKET};

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Suite settings.
    #[serde(default)]
    pub suite: SuiteConfig,
    /// Blinding settings.
    #[serde(default)]
    pub blinding: BlindingConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Suite configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Domain-separation context. Client and server must agree on it.
    #[serde(default = "default_context")]
    pub context: String,
}

/// Blinding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlindingConfig {
    /// Pad hash-to-group work so timing hides the input length.
    #[serde(default = "default_true")]
    pub constant_time: bool,
    /// Smallest padding bucket in bytes.
    #[serde(default = "default_min_padding_bucket")]
    pub min_padding_bucket: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace" | "debug" | "info" | "warn" | "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions

fn default_context() -> String {
    String::from_utf8_lossy(DEFAULT_CONTEXT).into_owned()
}

fn default_true() -> bool {
    true
}

fn default_min_padding_bucket() -> usize {
    LengthPadding::default().min_bucket
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            context: default_context(),
        }
    }
}

impl Default for BlindingConfig {
    fn default() -> Self {
        Self {
            constant_time: true,
            min_padding_bucket: default_min_padding_bucket(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl CliConfig {
    /// Load configuration from the default config file location.
    ///
    /// Falls back to defaults if file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: CliConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Build the OPRF suite described by this configuration.
    pub fn suite(&self) -> anyhow::Result<Suite> {
        if self.suite.context.as_bytes() == DEFAULT_CONTEXT {
            return Ok(Suite::default());
        }
        Ok(Suite::with_context(self.suite.context.as_bytes())?)
    }

    /// Length padding for the constant-time blinding path.
    ///
    /// Fails if `min_padding_bucket` is zero or above [`MAX_MIN_BUCKET`].
    pub fn padding(&self) -> anyhow::Result<LengthPadding> {
        LengthPadding::new(self.blinding.min_padding_bucket)
            .context("blinding.min_padding_bucket is out of range")
    }

    /// Get the config file path.
    fn config_path() -> PathBuf {
        // Check env var override first
        if let Ok(path) = std::env::var("VEIL_CONFIG") {
            return PathBuf::from(path);
        }
        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".veil"))
            .unwrap_or_else(|_| PathBuf::from("/tmp/veil"))
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.suite.context.as_bytes(), DEFAULT_CONTEXT);
        assert!(config.blinding.constant_time);
        assert_eq!(config.blinding.min_padding_bucket, 1024);
        assert_eq!(config.logging.log_level, "warn");
    }

    #[test]
    fn test_config_serialization() {
        let config = CliConfig::default();
        let toml_str = toml::to_string(&config).expect("serialize");
        let parsed: CliConfig = toml::from_str(&toml_str).expect("parse");
        assert_eq!(parsed.suite.context, config.suite.context);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: CliConfig = toml::from_str(
            r#"
            [blinding]
            constant_time = false
            "#,
        )
        .expect("parse");
        assert!(!parsed.blinding.constant_time);
        assert_eq!(parsed.blinding.min_padding_bucket, 1024);
        assert_eq!(parsed.suite.context.as_bytes(), DEFAULT_CONTEXT);
    }

    #[test]
    fn test_custom_context_suite() {
        let mut config = CliConfig::default();
        config.suite.context = "my-app v2".to_string();
        let suite = config.suite().expect("suite");
        assert_eq!(suite.context(), b"my-app v2");
    }

    #[test]
    fn test_empty_context_rejected() {
        let mut config = CliConfig::default();
        config.suite.context = String::new();
        assert!(config.suite().is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = CliConfig::load_from(Path::new("/nonexistent/veil/config.toml"))
            .expect("load");
        assert_eq!(config.padding().expect("padding"), LengthPadding::default());
    }

    #[test]
    fn test_oversized_padding_bucket_rejected() {
        let parsed: CliConfig = toml::from_str(
            r#"
            [blinding]
            min_padding_bucket = 1099511627776
            "#,
        )
        .expect("parse");
        assert!(parsed.padding().is_err());

        let mut config = CliConfig::default();
        config.blinding.min_padding_bucket = MAX_MIN_BUCKET;
        assert!(config.padding().is_ok());
        config.blinding.min_padding_bucket = MAX_MIN_BUCKET + 1;
        assert!(config.padding().is_err());
    }

    #[test]
    fn test_zero_padding_bucket_rejected() {
        let mut config = CliConfig::default();
        config.blinding.min_padding_bucket = 0;
        assert!(config.padding().is_err());
    }
}
