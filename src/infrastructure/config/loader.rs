use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Upper bound for cache durations, ten years in seconds
const MAX_DURATION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid cache.max_size: {0}. Must be at least 1")]
    InvalidMaxCacheSize(usize),

    #[error("Invalid scheduler.max_concurrent: {0}. Must be between 1 and 64")]
    InvalidMaxConcurrent(usize),

    #[error("Invalid cache.max_failures: {0}. Must be at least 1")]
    InvalidMaxFailures(u32),

    #[error("Invalid {0}: must be between 1 second and 10 years")]
    InvalidDuration(&'static str),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid resolver.base_url: {0}. Must start with http:// or https://")]
    InvalidBaseUrl(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .handle-resolver/config.yaml
    /// 3. .handle-resolver/local.yaml (optional local overrides)
    /// 4. Environment variables (HANDLE_RESOLVER_* prefix, `__` between sections)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".handle-resolver/config.yaml"))
            .merge(Yaml::file(".handle-resolver/local.yaml"))
            .merge(Env::prefixed("HANDLE_RESOLVER_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Environment variables still override values from the file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("HANDLE_RESOLVER_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.cache.max_size == 0 {
            return Err(ConfigError::InvalidMaxCacheSize(config.cache.max_size));
        }

        if config.cache.max_failures == 0 {
            return Err(ConfigError::InvalidMaxFailures(config.cache.max_failures));
        }

        if config.cache.ttl_secs == 0 || config.cache.ttl_secs > MAX_DURATION_SECS {
            return Err(ConfigError::InvalidDuration("cache.ttl_secs"));
        }

        if config.cache.failure_cooldown_secs > MAX_DURATION_SECS {
            return Err(ConfigError::InvalidDuration("cache.failure_cooldown_secs"));
        }

        if config.scheduler.max_concurrent == 0 || config.scheduler.max_concurrent > 64 {
            return Err(ConfigError::InvalidMaxConcurrent(
                config.scheduler.max_concurrent,
            ));
        }

        if config.resolver.timeout_secs == 0 {
            return Err(ConfigError::InvalidDuration("resolver.timeout_secs"));
        }

        let base_url = &config.resolver.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(base_url.clone()));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }
}
