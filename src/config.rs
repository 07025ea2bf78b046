//! Layered configuration: built-in defaults, an optional `quartermaster.yaml`
//! in the working directory, `QUARTERMASTER_`-prefixed environment
//! variables, then CLI flags — in that order, CLI winning (spec §6.3).
//!
//! Grounded on `infrastructure/config/loader.rs`'s `ConfigLoader`, with the
//! project dotdir dropped (this controller has no per-project home the way
//! the teacher's agent swarm does) and a CLI-overlay step added on top of
//! figment's merge chain, since the teacher never needed CLI to outrank env.

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default config file consulted in the current working directory.
const CONFIG_FILE: &str = "quartermaster.yaml";
const ENV_PREFIX: &str = "QUARTERMASTER_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    #[error("token must not be empty")]
    EmptyToken,

    #[error("port must be nonzero")]
    InvalidPort,

    #[error("default_memory_mb must be positive, got {0}")]
    InvalidMemory(i64),

    #[error("node_interval_secs must be positive, got {0}")]
    InvalidNodeInterval(u64),

    #[error("service_interval_secs must be positive, got {0}")]
    InvalidServiceInterval(u64),

    #[error("retry_interval_secs must be positive, got {0}")]
    InvalidRetryInterval(u64),

    #[error("queue_capacity must be nonzero")]
    InvalidQueueCapacity,

    #[error("log level must be one of trace, debug, info, warn, error; got {0}")]
    InvalidLogLevel(String),

    #[error("log format must be one of json, pretty; got {0}")]
    InvalidLogFormat(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Everything the controller needs to run, per SPEC_FULL §6.3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Root bearer token admission/lifecycle requests must present.
    pub token: String,
    pub port: u16,
    /// Default service memory limit in MiB when a `/run` request omits one.
    pub default_memory_mb: i64,
    pub node_interval_secs: u64,
    pub service_interval_secs: u64,
    pub retry_interval_secs: u64,
    pub queue_capacity: usize,
    /// Base URL of the swarm/Docker Engine API.
    pub swarm_endpoint: String,
    pub log: LoggingConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            port: 9090,
            default_memory_mb: 250,
            node_interval_secs: 300,
            service_interval_secs: 30,
            retry_interval_secs: 5,
            queue_capacity: 1000,
            swarm_endpoint: "http://localhost:2375".to_string(),
            log: LoggingConfig::default(),
        }
    }
}

impl ControllerConfig {
    pub fn memory_bytes_default(&self) -> u64 {
        (self.default_memory_mb.max(0) as u64) * crate::MIB
    }
}

/// CLI overrides, applied after the figment chain so flags always win.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub token: Option<String>,
    pub port: Option<u16>,
    pub memory: Option<i64>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults -> `quartermaster.yaml` -> `QUARTERMASTER_*` env vars,
    /// apply CLI overrides, then validate.
    pub fn load(cli: &CliOverrides) -> Result<ControllerConfig, ConfigError> {
        let mut config: ControllerConfig = Figment::new()
            .merge(Serialized::defaults(ControllerConfig::default()))
            .merge(Yaml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        if let Some(token) = &cli.token {
            config.token = token.clone();
        }
        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(memory) = cli.memory {
            config.default_memory_mb = memory;
        }

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &ControllerConfig) -> Result<(), ConfigError> {
        if config.token.is_empty() {
            return Err(ConfigError::EmptyToken);
        }
        if config.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if config.default_memory_mb <= 0 {
            return Err(ConfigError::InvalidMemory(config.default_memory_mb));
        }
        if config.node_interval_secs == 0 {
            return Err(ConfigError::InvalidNodeInterval(config.node_interval_secs));
        }
        if config.service_interval_secs == 0 {
            return Err(ConfigError::InvalidServiceInterval(
                config.service_interval_secs,
            ));
        }
        if config.retry_interval_secs == 0 {
            return Err(ConfigError::InvalidRetryInterval(config.retry_interval_secs));
        }
        if config.queue_capacity == 0 {
            return Err(ConfigError::InvalidQueueCapacity);
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&config.log.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.log.level.clone()));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&config.log.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.log.format.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ControllerConfig {
        ControllerConfig {
            token: "secret".to_string(),
            ..ControllerConfig::default()
        }
    }

    #[test]
    fn default_config_is_valid_once_token_is_set() {
        let config = valid_config();
        ConfigLoader::validate(&config).expect("default config (plus token) should be valid");
    }

    #[test]
    fn empty_token_is_rejected() {
        let config = ControllerConfig::default();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyToken)
        ));
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut config = valid_config();
        config.port = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidPort)
        ));
    }

    #[test]
    fn nonpositive_memory_is_rejected() {
        let mut config = valid_config();
        config.default_memory_mb = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMemory(0))
        ));
    }

    #[test]
    fn zero_queue_capacity_is_rejected() {
        let mut config = valid_config();
        config.queue_capacity = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidQueueCapacity)
        ));
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let mut config = valid_config();
        config.log.level = "verbose".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn cli_overrides_win_over_everything_else() {
        let cli = CliOverrides {
            token: Some("from-cli".to_string()),
            port: Some(1234),
            memory: Some(512),
        };
        let config = ConfigLoader::load(&cli).expect("load should succeed with cli token");
        assert_eq!(config.token, "from-cli");
        assert_eq!(config.port, 1234);
        assert_eq!(config.default_memory_mb, 512);
    }

    #[test]
    fn memory_bytes_default_converts_mib_to_bytes() {
        let config = valid_config();
        assert_eq!(config.memory_bytes_default(), 250 * crate::MIB);
    }
}
