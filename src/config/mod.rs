//! Verification configuration.
//!
//! Aggregates the poll defaults and cluster API settings into a single
//! Config struct that can be loaded from YAML files or environment variables.
//! Configuration is read once, when a verifier is built; polls never go back
//! to the environment.

mod cluster;
mod poll;

pub use cluster::{CamelKConfig, KnativeConfig, KubernetesConfig};
pub use poll::PollConfig;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "kverify.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "KVERIFY_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "KVERIFY";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "KVERIFY_LOG";
/// Environment variable selecting the log output format (`json` or text).
pub const LOG_FORMAT_ENV_VAR: &str = "KVERIFY_LOG_FORMAT";
/// Environment variable for Kubernetes namespace.
pub const NAMESPACE_ENV_VAR: &str = "NAMESPACE";
/// Alternative environment variable for Kubernetes namespace (downward API).
pub const POD_NAMESPACE_ENV_VAR: &str = "POD_NAMESPACE";

use serde::Deserialize;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),
}

/// Main configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Poll defaults (attempt budget, delay, interrupt handling).
    pub poll: PollConfig,
    /// Kubernetes settings.
    pub kubernetes: KubernetesConfig,
    /// Camel-K API versions.
    pub camel_k: CamelKConfig,
    /// Knative API versions.
    pub knative: KnativeConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `kverify.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix, `__` separated
    ///    (e.g. `KVERIFY__POLL__MAX_ATTEMPTS=10`)
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Parse configuration from a YAML string (no environment overrides).
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, File, FileFormat};

        let config = ConfigLib::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        Self::default()
    }
}
